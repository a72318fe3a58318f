//! Startup banner for the HTTP server.

use std::net::SocketAddr;

use crate::consts::{AUTHOR, REPO};

/// Server configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub listen: SocketAddr,
    pub planner: &'a str,
    pub runner: &'a str,
    pub units: &'a [&'a str],
}

pub fn render_banner(info: &BannerInfo) -> String {
    format!(
        r#"
   ╔═══════════════════════════════════════╗
   ║             S L U I C E               ║
   ║    one request, many small units      ║
   ╚═══════════════════════════════════════╝

   version   {}
   by        {}
   repo      {}
   planner   {}
   runner    {}
   units     {}
   listen    http://{}
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        REPO,
        info.planner,
        info.runner,
        info.units.join(", "),
        info.listen,
    )
}

pub fn print_banner(info: &BannerInfo) {
    println!("{}", render_banner(info));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_shows_server_setup() {
        let banner = render_banner(&BannerInfo {
            listen: "127.0.0.1:5000".parse().unwrap(),
            planner: "keywords",
            runner: "docker",
            units: &["data-cleaning", "text-summarization"],
        });
        assert!(banner.contains("S L U I C E"));
        assert!(banner.contains("http://127.0.0.1:5000"));
        assert!(banner.contains("data-cleaning, text-summarization"));
        assert!(banner.contains(env!("CARGO_PKG_VERSION")));
    }
}
