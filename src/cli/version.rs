/// Display version information
pub fn execute() {
    println!("asset-governance {}", env!("CARGO_PKG_VERSION"));
    println!("Proposal, vote and asset issuance rules for a permissioned ledger");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_execute() {
        execute();
    }
}
