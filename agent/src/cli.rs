/// Minimal `--flag value` lookup for the `whitelist`/`whitelistall`
/// binaries. Argument parsing is explicitly out of scope for this agent
/// (spec §1) — this mirrors the original's flag handling rather than
/// pulling in a parsing crate for two optional strings.
pub fn parse_flag(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == name)
        .and_then(|index| args.get(index + 1))
        .cloned()
}
