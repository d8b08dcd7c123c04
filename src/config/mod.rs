use thiserror::Error;

/// Read at build time, the same way the page bundler injects it.
const PROJECT_ID: Option<&str> = option_env!("PROJECT_ID");

pub const APP_NAME: &str = "Cybor Solana Demo";
pub const APP_DESCRIPTION: &str = "Set Up a Solana-Compatible Wallet: You'll need a wallet like Phantom or Sollet that supports Solana-based tokens and NFTs. Ensure you have some SOL (Solana's native token) to cover transaction fees.

Connect to the Game Platform: If the Cybor game is hosted on a decentralized platform, you will likely connect your wallet to the game's website or dApp (decentralized application) through your browser.

Interact with the Game: Once connected, you can explore the features of the game. Given Cybor's unique gameplay of collecting \"memory fragments\" through battles and using them to upgrade Imprint NFTs, you'd interact with various gameplay elements directly on the Solana network.

On-Chain Gameplay: Solana's high throughput and low latency would allow you to perform actions like battling, minting NFTs, upgrading assets, and transferring game tokens efficiently.

Check with the Cybor game's official site or community for specific links to the platform running on Solana.";
pub const APP_URL: &str = "https://www.6sig.io";
pub const APP_ICON: &str = "https://cybordemo.game.6sig.io/mo_hom.png";
pub const FAUCET_URL: &str = "https://solfaucet.com/";
pub const WEBSITE_URL: &str = "https://miner.game.6sig.io/";
pub const GITHUB_URL: &str = "https://github.com/6-sigma";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Project ID is undefined")]
    MissingProjectId,
}

/// Locations of the Unity WebGL build artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct UnityBuild {
    pub loader_url: String,
    pub data_url: String,
    pub framework_url: String,
    pub code_url: String,
}

impl UnityBuild {
    pub fn from_dir(dir: &str, name: &str) -> Self {
        Self {
            loader_url: format!("{dir}/Build/{name}.loader.js"),
            data_url: format!("{dir}/Build/{name}.data"),
            framework_url: format!("{dir}/Build/{name}.framework.js"),
            code_url: format!("{dir}/Build/{name}.wasm"),
        }
    }
}

impl Default for UnityBuild {
    fn default() -> Self {
        Self::from_dir("Build-WebGL", "Build-WebGL")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub project_id: String,
    pub app_name: String,
    pub app_description: String,
    pub app_url: String,
    pub app_icon: String,
    pub build: UnityBuild,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::with_project_id(PROJECT_ID)
    }

    pub fn with_project_id(project_id: Option<&str>) -> Result<Self, ConfigError> {
        let project_id = project_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::MissingProjectId)?;
        Ok(Self {
            project_id: project_id.to_string(),
            app_name: APP_NAME.to_string(),
            app_description: APP_DESCRIPTION.to_string(),
            app_url: APP_URL.to_string(),
            app_icon: APP_ICON.to_string(),
            build: UnityBuild::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_project_id_fails_fast() {
        assert_eq!(Config::with_project_id(None), Err(ConfigError::MissingProjectId));
        assert_eq!(Config::with_project_id(Some("  ")), Err(ConfigError::MissingProjectId));
    }

    #[test]
    fn build_urls_follow_unity_layout() {
        let config = Config::with_project_id(Some("abc123")).unwrap();
        assert_eq!(config.project_id, "abc123");
        assert_eq!(config.build.loader_url, "Build-WebGL/Build/Build-WebGL.loader.js");
        assert_eq!(config.build.code_url, "Build-WebGL/Build/Build-WebGL.wasm");
    }

    #[test]
    fn modal_metadata_carries_the_full_description() {
        let config = Config::with_project_id(Some("abc123")).unwrap();
        let paragraphs: Vec<&str> = config.app_description.split("\n\n").collect();
        assert_eq!(paragraphs.len(), 5);
        assert!(paragraphs[0].starts_with("Set Up a Solana-Compatible Wallet"));
        assert!(paragraphs[2].contains("\"memory fragments\""));
        assert!(paragraphs[4].ends_with("running on Solana."));
    }
}
