//! 部署类检查：Docker、环境配置、部署脚本

use crate::check::registry::{tally, FnCheck, Outcome};
use crate::check::workspace::Workspace;
use crate::utils::{Category, Result};

pub const CHECKS: [FnCheck; 3] = [
    FnCheck::new("Docker Configuration", Category::Deployment, docker_config),
    FnCheck::new("Environment Configs", Category::Deployment, env_configs),
    FnCheck::new("Deployment Scripts", Category::Deployment, deployment_scripts),
];

const SETUP_SCRIPTS: [&str; 4] = [
    "setup_rpc_node.sh",
    "setup_validator.sh",
    "setup_faucet.sh",
    "setup_explorer.sh",
];

pub fn docker_config(ws: &Workspace) -> Result<Outcome> {
    let r = ws.repos();
    let files = ws.existing(&[&r.core, &r.web, &r.deploy], &["Dockerfile", "docker-compose.yml"]);
    Ok(tally(files, 20.0, 3, "Docker files", "files"))
}

pub fn env_configs(ws: &Workspace) -> Result<Outcome> {
    let r = ws.repos();
    let configs = ws.existing(
        &[&r.core, &r.web, &r.deploy],
        &[".env.example", ".env.testnet", "config.testnet.toml"],
    );
    Ok(tally(configs, 25.0, 3, "env configs", "configs"))
}

pub fn deployment_scripts(ws: &Workspace) -> Result<Outcome> {
    let deploy = ws.repo(&ws.repos().deploy);
    let scripts: Vec<String> = SETUP_SCRIPTS
        .iter()
        .filter(|s| deploy.join(s).exists())
        .map(|s| s.to_string())
        .collect();
    Ok(tally(scripts, 25.0, 3, "deployment scripts", "scripts"))
}
