//! Command-line interface for `dhv-xc-sync`.

use std::convert::Infallible;
use std::path::PathBuf;

use clap::Parser;
use dhv_xc_client::Credentials;
use secrecy::SecretString;

use crate::runner::SyncOptions;

/// dhv-xc-sync - download your DHV-XC flights as IGC files
///
/// Tracks are saved to `<dir>/<date>/<id>.igc`.
#[derive(Debug, Parser)]
#[command(name = "dhv-xc-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// DHV-XC user name
    #[arg(short, long, env = "DHV_XC_USER")]
    pub user: String,

    /// DHV-XC user password
    #[arg(short, long, env = "DHV_XC_PASS", hide_env_values = true, value_parser = parse_secret)]
    pub pass: SecretString,

    /// Target directory
    #[arg(short, long, value_name = "DIR")]
    pub dir: PathBuf,

    /// List flights only, do not download
    #[arg(short, long)]
    pub list: bool,

    /// Download flight with specific ID only (0 downloads all)
    #[arg(short, long, value_name = "ID", default_value_t = 0)]
    pub id: u64,
}

fn parse_secret(s: &str) -> Result<SecretString, Infallible> {
    Ok(SecretString::new(s.into()))
}

impl Cli {
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.user.clone(), self.pass.clone())
    }

    #[must_use]
    pub fn options(&self) -> SyncOptions {
        SyncOptions {
            target_dir: self.dir.clone(),
            list_only: self.list,
            flight_id: (self.id != 0).then_some(self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use secrecy::ExposeSecret;

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "dhv-xc-sync");
    }

    #[test]
    fn test_parse_short_flags() {
        let args = vec!["dhv-xc-sync", "-u", "pilot", "-p", "secret", "-d", "/tmp/xc"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.user, "pilot");
        assert_eq!(cli.pass.expose_secret(), "secret");
        assert_eq!(cli.dir, PathBuf::from("/tmp/xc"));
        assert!(!cli.list);
        assert_eq!(cli.id, 0);
        assert_eq!(cli.options().flight_id, None);
    }

    #[test]
    fn test_parse_long_flags() {
        let args = vec![
            "dhv-xc-sync",
            "--user",
            "pilot",
            "--pass",
            "secret",
            "--dir",
            "out",
            "--list",
            "--id",
            "1234",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let opts = cli.options();
        assert!(opts.list_only);
        assert_eq!(opts.flight_id, Some(1234));
        assert_eq!(opts.target_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_id_must_be_numeric() {
        let args = vec!["dhv-xc-sync", "-u", "a", "-p", "b", "-d", "c", "-i", "abc"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_dir_is_required() {
        let args = vec!["dhv-xc-sync", "-u", "a", "-p", "b"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_debug_hides_password() {
        let args = vec!["dhv-xc-sync", "-u", "pilot", "-p", "hunter2", "-d", "x"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(!format!("{cli:?}").contains("hunter2"));
        assert!(!format!("{:?}", cli.credentials()).contains("hunter2"));
    }
}
