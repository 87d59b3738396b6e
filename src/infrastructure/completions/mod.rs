pub mod http;

use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::CompletionBox;

pub struct CompletionManager {}

impl CompletionManager {
    pub fn get() -> Result<CompletionBox> {
        let timeout = Config::get(ConfigKey::CompletionTimeout).parse::<u64>()?;
        return Ok(Box::new(http::HttpCompletion::new(
            &Config::get(ConfigKey::CompletionURL),
            timeout,
        )));
    }
}
