//! # Resolve Command Implementation
//!
//! Resolves a repository URL to its provider, project, branch and sub-path
//! without scanning it. Useful to check how an ambiguous `<branch>/<path>`
//! remainder was split.

use anyhow::Result;
use clap::Args;

use super::Context;
use kustomap::disambiguate::Confidence;
use kustomap::output::{marker, Marker};
use kustomap::suggestions;

/// Resolve a repository URL
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// GitHub or GitLab tree/blob URL
    #[arg(value_name = "URL")]
    pub url: String,

    /// Print the resolution as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the `resolve` command.
pub fn execute(args: ResolveArgs, context: &Context) -> Result<()> {
    let scanner = context.scanner()?;
    let resolution = scanner.resolve(&args.url).map_err(suggestions::explain)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    let coordinate = &resolution.coordinate;
    let sub_path = if coordinate.sub_path.is_empty() {
        "."
    } else {
        coordinate.sub_path.as_str()
    };
    println!("Provider:   {}", coordinate.provider);
    println!("Host:       {}", coordinate.host);
    println!("Project:    {}", coordinate.project_path());
    println!("Branch:     {}", coordinate.branch);
    println!("Path:       {}", sub_path);

    match resolution.confidence {
        Confidence::Confirmed => println!(
            "{} Branch confirmed by the provider",
            marker(&context.output, Marker::Success)
        ),
        Confidence::DefaultBranch => println!("No branch in the URL; assumed {}", coordinate.branch),
        Confidence::Fallback => println!(
            "{} Branch could not be confirmed; the whole remainder was used",
            marker(&context.output, Marker::Warning)
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kustomap::config::{Credentials, Settings};
    use kustomap::output::OutputConfig;

    fn context() -> Context {
        Context::new(Settings::default(), Credentials::default(), OutputConfig { use_color: false })
    }

    #[test]
    fn test_short_github_url_needs_no_network() {
        let args = ResolveArgs {
            url: "https://github.com/acme/infra".to_string(),
            json: false,
        };
        assert!(execute(args, &context()).is_ok());
    }

    #[test]
    fn test_unrecognized_url_has_hint() {
        let args = ResolveArgs {
            url: "https://bitbucket.org/acme/infra".to_string(),
            json: true,
        };
        let err = execute(args, &context()).unwrap_err();
        assert!(err.to_string().contains("Unrecognized source"));
    }
}
