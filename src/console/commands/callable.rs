use std::path::PathBuf;

use crate::configuration::Settings;
use crate::policy::AccessPolicy;

pub trait CallableTrait {
    fn call(&self, settings: &Settings) -> Result<(), Box<dyn std::error::Error>>;
}

/// A command that evaluates something against the access policy and prints
/// the result on stdout.
pub trait PolicyCommand {
    fn policy_file(&self) -> Option<&PathBuf>;

    fn run(&self, policy: &AccessPolicy) -> Result<String, Box<dyn std::error::Error>>;
}

impl<T: PolicyCommand> CallableTrait for T {
    fn call(&self, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
        let policy = settings.load_policy(self.policy_file())?;
        let output = self.run(&policy)?;
        println!("{}", output);
        Ok(())
    }
}
