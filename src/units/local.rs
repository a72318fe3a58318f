use async_trait::async_trait;

use super::{Unit, UnitName, UnitParams};
use crate::error::UnitError;

/// Runs a unit's transform on a blocking thread inside this process.
///
/// Same output as the containerized unit, without the process startup cost.
/// Handy for tests and for hosts without docker.
pub struct InProcessUnit {
    name: UnitName,
}

impl InProcessUnit {
    pub fn new(name: UnitName) -> Self {
        Self { name }
    }
}

#[async_trait]
impl Unit for InProcessUnit {
    fn name(&self) -> UnitName {
        self.name
    }

    async fn process(&self, input: &str, params: &UnitParams) -> Result<String, UnitError> {
        let name = self.name;
        let input = input.to_string();
        let params = *params;
        tokio::task::spawn_blocking(move || super::apply(name, &input, &params))
            .await
            .map_err(|e| UnitError::Io(std::io::Error::other(e)))?
    }
}
