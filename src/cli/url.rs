//! `url` command: resolve one image against the configured scopes

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::component::Image;
use crate::config::{load_config, load_vocabulary, merge_cli_overrides, CliOverrides};
use crate::responsive::WidthCache;
use crate::scope::ContextFrame;

use super::args::{parse_list, parse_pairs};
use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Arguments of the `url` command
#[derive(Debug, Default)]
pub struct UrlArgs<'a> {
    pub public_id: &'a str,
    pub config: Option<&'a Path>,
    pub cloud_name: Option<&'a str>,
    pub secure: bool,
    pub vocabulary: Option<&'a PathBuf>,
    pub breakpoint_step: Option<u32>,
    pub scopes: &'a [String],
    pub options: &'a [String],
    pub steps: &'a [String],
    pub container_width: Option<f64>,
    pub attrs: bool,
}

/// Execute the url command
pub fn run_url(args: UrlArgs<'_>) -> ExitCode {
    let mut config = match load_config(args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let overrides = CliOverrides {
        cloud_name: args.cloud_name.map(str::to_string),
        secure: args.secure.then_some(true),
        step: args.breakpoint_step,
        vocabulary: args.vocabulary.cloned(),
    };
    merge_cli_overrides(&mut config, &overrides);

    let vocabulary = match load_vocabulary(&config) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut ambient = config.root_context(&vocabulary);
    for scope in args.scopes {
        let props = match parse_list(scope) {
            Ok(bag) => bag,
            Err(e) => {
                eprintln!("Error: --scope: {}", e);
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        };
        ambient = ContextFrame::enter(&ambient, &props, &vocabulary).context;
    }

    let mut props = match parse_pairs(args.options) {
        Ok(bag) => bag,
        Err(e) => {
            eprintln!("Error: --option: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    props.push("publicId", args.public_id);

    let mut image = Image::new(props);
    for step in args.steps {
        match parse_list(step) {
            Ok(bag) => image = image.with_transformation(bag),
            Err(e) => {
                eprintln!("Error: --step: {}", e);
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        }
    }

    let container_width = args.container_width;
    let measure = move || container_width;
    let resolved = match image.resolve(&ambient, &measure, &mut WidthCache::new(), &vocabulary) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let Some(url) = resolved.url else {
        eprintln!("Error: no URL for '{}' (is a cloud name configured?)", args.public_id);
        return ExitCode::from(EXIT_ERROR);
    };
    println!("{}", url);

    if args.attrs {
        match serde_json::to_string_pretty(&resolved.attributes) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}
