use anyhow::{bail, Result};
use clap::{Arg, ArgAction, Command};

use crate::region::Mode;

/// Resolve the sharing mode from the raw argument list.
///
/// Exactly one of `--shared` / `--private` is accepted; anything else (no
/// args, both flags, unknown tokens, stray operands) is a usage error. The
/// caller prints the usage line and exits, so the error here carries no
/// message worth showing.
pub fn mode_from<I, T>(args: I) -> Result<Mode>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    // clap's own help/version/error output is suppressed: the contract is a
    // single usage line on stderr for every bad invocation.
    let matches = Command::new("oom_alloc")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("shared")
                .long("shared")
                .action(ArgAction::SetTrue)
                .conflicts_with("private"),
        )
        .arg(Arg::new("private").long("private").action(ArgAction::SetTrue))
        .try_get_matches_from(args)?;

    match (matches.get_flag("shared"), matches.get_flag("private")) {
        (true, false) => Ok(Mode::Shared),
        (false, true) => Ok(Mode::Private),
        _ => bail!("one of --shared / --private is required"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Mode> {
        mode_from(std::iter::once("oom_alloc").chain(args.iter().copied()))
    }

    #[test]
    fn shared_and_private() {
        assert_eq!(parse(&["--shared"]).unwrap(), Mode::Shared);
        assert_eq!(parse(&["--private"]).unwrap(), Mode::Private);
    }

    #[test]
    fn no_args_is_an_error() {
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn both_flags_is_an_error() {
        assert!(parse(&["--shared", "--private"]).is_err());
    }

    #[test]
    fn unknown_tokens_are_errors() {
        assert!(parse(&["--bogus"]).is_err());
        assert!(parse(&["shared"]).is_err());
        assert!(parse(&["--shared", "extra"]).is_err());
        assert!(parse(&["--help"]).is_err());
    }
}
