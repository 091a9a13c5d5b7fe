pub mod hosts;
pub mod paths;
pub mod settings;
pub mod ssh_config;

pub use hosts::{DEFAULT_SSH_PORT, HostRecord, find_host};
pub use settings::ClientSettings;
pub use ssh_config::{
    IdPolicy, ParseOptions, get_hosts, load_hosts_from_ssh_config, parse_ssh_config,
    parse_ssh_config_with, read_hosts,
};
