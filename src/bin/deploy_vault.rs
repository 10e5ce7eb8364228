use ethers::{
    abi::Abi,
    contract::ContractFactory,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, Bytes},
};
use serde::Deserialize;
use std::{env, sync::Arc};
use tracing::{error, info};

const DEFAULT_EXPLORER_BASE_URL: &str = "https://optimistic.etherscan.io";
const DEFAULT_ARTIFACT_PATH: &str =
    "artifacts/contracts/ReturnFinanceUSDCVault.sol/ReturnFinanceUSDCVault.json";

/// Compiled contract as written by Hardhat.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractArtifact {
    contract_name: Option<String>,
    abi: Abi,
    bytecode: Bytes,
}

#[derive(Debug)]
struct DeployConfig {
    rpc_url: String,
    private_key: String,
    artifact_path: String,
    explorer_base_url: String,
}

impl DeployConfig {
    fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        let rpc_url = env::var("DEPLOY_RPC_URL")
            .map_err(|_| anyhow::anyhow!("Missing DEPLOY_RPC_URL in env."))?;
        let private_key = env::var("DEPLOYER_PRIVATE_KEY")
            .map_err(|_| anyhow::anyhow!("Missing DEPLOYER_PRIVATE_KEY in env."))?;
        let artifact_path =
            env::var("VAULT_ARTIFACT_PATH").unwrap_or_else(|_| DEFAULT_ARTIFACT_PATH.to_string());
        let explorer_base_url = env::var("EXPLORER_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_EXPLORER_BASE_URL.to_string());

        Ok(Self {
            rpc_url,
            private_key,
            artifact_path,
            explorer_base_url,
        })
    }
}

fn parse_artifact(raw: &str) -> anyhow::Result<ContractArtifact> {
    let artifact: ContractArtifact = serde_json::from_str(raw)
        .map_err(|e| anyhow::anyhow!("Invalid contract artifact: {e}"))?;
    if artifact.bytecode.is_empty() {
        anyhow::bail!("Artifact has no bytecode; is the contract abstract?");
    }
    Ok(artifact)
}

fn explorer_address_url(base: &str, address: Address) -> String {
    format!("{}/address/{:?}", base.trim_end_matches('/'), address)
}

async fn deploy(config: &DeployConfig) -> anyhow::Result<Address> {
    let raw = std::fs::read_to_string(&config.artifact_path)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", config.artifact_path))?;
    let artifact = parse_artifact(&raw)?;
    info!(
        "Deploying {} ({} bytes of bytecode)",
        artifact.contract_name.as_deref().unwrap_or("vault"),
        artifact.bytecode.len()
    );

    let provider = Provider::<Http>::try_from(config.rpc_url.as_str())?;
    let chain_id = provider.get_chainid().await?;
    let wallet: LocalWallet = config.private_key.trim_start_matches("0x").parse()?;
    let wallet = wallet.with_chain_id(chain_id.as_u64());
    info!("Deployer {:?} on chain {}", wallet.address(), chain_id);

    let client = Arc::new(SignerMiddleware::new(provider, wallet));
    let factory = ContractFactory::new(artifact.abi, artifact.bytecode, client);
    let contract = factory.deploy(())?.send().await?;

    Ok(contract.address())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deploy_vault=info".into()),
        )
        .init();

    info!("Starting deploy Return Finance USDC Vault...");
    let result = match DeployConfig::from_env() {
        Ok(config) => deploy(&config)
            .await
            .map(|address| explorer_address_url(&config.explorer_base_url, address)),
        Err(e) => Err(e),
    };

    match result {
        Ok(url) => {
            println!("Return Finance USDC Vault deployed to: {url}");
            std::process::exit(0);
        }
        Err(e) => {
            error!("Deployment failed: {e:#}");
            std::process::exit(1);
        }
    }
}
