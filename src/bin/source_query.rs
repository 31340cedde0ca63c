//! Query product sources from the command line.
//!
//! Loads the configured product profiles (or ad hoc ones named with
//! `--product`), runs one category, product or exact-source query against
//! the datasets under the data root, and prints one JSON object per hit:
//! `{"product": ..., "id": ..., "source": {...}}`.

use anyhow::{Context, Result, anyhow, bail};
use product_sources::{
    CategoryDescriptor, ChannelRule, DataLayout, FileDatasetLoader, LanguageRule,
    ProductDescriptor, ProductHit, ProductProfile, ProfileSet, SourceEntry, SourceRepository,
    SourcesSchema, split_list,
};
use semver::Version;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const PROFILES_FILE_NAME: &str = "profiles.json";

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse_from(std::env::args_os().skip(1))?;
    init_logging(args.verbose);

    let layout = match &args.data_root {
        Some(root) => DataLayout::new(root),
        None => DataLayout::discover()?,
    };
    tracing::debug!(root = %layout.root().display(), "using data root");

    let profiles = select_profiles(&args, &layout)?;
    let mut loader = FileDatasetLoader::new(layout).with_schema_validation(!args.no_schema);
    if let Some(path) = &args.schema {
        if args.no_schema {
            bail!("--schema cannot be combined with --no-schema");
        }
        loader = loader.with_schema(SourcesSchema::from_path(path)?);
    }
    let repository = SourceRepository::from_profiles(profiles, Arc::new(loader));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &args.query {
        Query::Category(category) => {
            for hit in repository.sources_for_category(Some(category))? {
                writeln!(out, "{}", serde_json::to_string(&hit)?)?;
            }
        }
        Query::Product { descriptor, source } => {
            let descriptor = descriptor.resolve()?;
            match source {
                Some(name) => {
                    for (product, record) in repository.exact_source(&descriptor, name)? {
                        let hit = ProductHit {
                            product,
                            entry: SourceEntry {
                                id: &record.name,
                                record,
                            },
                        };
                        writeln!(out, "{}", serde_json::to_string(&hit)?)?;
                    }
                }
                None => {
                    for hit in repository.sources_for_product(&descriptor)? {
                        writeln!(out, "{}", serde_json::to_string(&hit)?)?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "product_sources=debug"
    } else {
        "product_sources=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Profiles from `--profiles` (or `<root>/profiles.json`), narrowed to
/// `--product` when given. Products without a configured profile get an ad
/// hoc one that honors the requested channel and declared languages.
fn select_profiles(args: &CliArgs, layout: &DataLayout) -> Result<ProfileSet> {
    let path = args
        .profiles
        .clone()
        .unwrap_or_else(|| layout.root().join(PROFILES_FILE_NAME));
    let configured = if args.profiles.is_some() || path.is_file() {
        ProfileSet::load(&path)?
    } else {
        ProfileSet::default()
    };

    let set = if args.products.is_empty() {
        if configured.profiles.is_empty() {
            let products = layout.products()?;
            ProfileSet {
                profiles: products.iter().map(|name| ad_hoc_profile(name)).collect(),
            }
        } else {
            configured
        }
    } else {
        let profiles = args
            .products
            .iter()
            .map(|name| {
                configured
                    .profiles
                    .iter()
                    .find(|profile| &profile.product == name)
                    .cloned()
                    .unwrap_or_else(|| ad_hoc_profile(name))
            })
            .collect();
        ProfileSet { profiles }
    };
    set.validate()?;
    Ok(set)
}

fn ad_hoc_profile(product: &str) -> ProductProfile {
    ProductProfile::new(product)
        .with_channel(ChannelRule::Requested)
        .with_language(LanguageRule::Declared)
}

#[derive(Debug)]
struct CliArgs {
    data_root: Option<PathBuf>,
    profiles: Option<PathBuf>,
    products: Vec<String>,
    query: Query,
    schema: Option<PathBuf>,
    no_schema: bool,
    verbose: bool,
}

#[derive(Debug)]
enum Query {
    Category(CategoryDescriptor),
    Product {
        descriptor: DescriptorInput,
        source: Option<String>,
    },
}

#[derive(Debug)]
enum DescriptorInput {
    Flags(ProductDescriptor),
    File(PathBuf),
    Stdin,
}

impl DescriptorInput {
    fn resolve(&self) -> Result<ProductDescriptor> {
        let raw = match self {
            DescriptorInput::Flags(descriptor) => return Ok(descriptor.clone()),
            DescriptorInput::File(path) => {
                fs::read(path).with_context(|| format!("reading {}", path.display()))?
            }
            DescriptorInput::Stdin => {
                let mut buf = Vec::new();
                io::stdin()
                    .read_to_end(&mut buf)
                    .context("reading stdin")?;
                buf
            }
        };
        serde_json::from_slice(&raw).context("failed to parse product descriptor")
    }
}

impl CliArgs {
    fn parse_from(args: impl IntoIterator<Item = OsString>) -> Result<Self> {
        let mut args = args.into_iter();
        let mut data_root: Option<PathBuf> = None;
        let mut profiles: Option<PathBuf> = None;
        let mut products: Vec<String> = Vec::new();
        let mut category_query: Option<CategoryDescriptor> = None;
        let mut descriptor = ProductDescriptor::default();
        let mut descriptor_source: Option<DescriptorInput> = None;
        let mut descriptor_flags = false;
        let mut source: Option<String> = None;
        let mut schema: Option<PathBuf> = None;
        let mut no_schema = false;
        let mut verbose = false;

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow!("argument is not valid UTF-8"))?;
            match arg.as_str() {
                "--data-root" => data_root = Some(PathBuf::from(next_value(&mut args, &arg)?)),
                "--profiles" => profiles = Some(PathBuf::from(next_value(&mut args, &arg)?)),
                "--product" => products.extend(split_list(&next_value(&mut args, &arg)?)),
                "--list-category" => {
                    let raw = next_value(&mut args, &arg)?;
                    category_query = Some(if raw == "*" {
                        CategoryDescriptor::any()
                    } else {
                        CategoryDescriptor::named(raw)
                    });
                }
                "--name" => {
                    descriptor.name = Some(next_value(&mut args, &arg)?);
                    descriptor_flags = true;
                }
                "--category" => {
                    descriptor.category = Some(next_value(&mut args, &arg)?);
                    descriptor_flags = true;
                }
                "--channel" => {
                    descriptor.channel = Some(next_value(&mut args, &arg)?);
                    descriptor_flags = true;
                }
                "--version" => {
                    let raw = next_value(&mut args, &arg)?;
                    let version = Version::parse(&raw)
                        .with_context(|| format!("invalid semver for --version: {raw}"))?;
                    descriptor.version = Some(version);
                    descriptor_flags = true;
                }
                "--language" => {
                    descriptor.language = Some(next_value(&mut args, &arg)?.as_str().into());
                    descriptor_flags = true;
                }
                "--descriptor" => {
                    let raw = next_value(&mut args, &arg)?;
                    if descriptor_source.is_some() {
                        bail!("--descriptor may only be provided once");
                    }
                    descriptor_source = Some(if raw == "-" {
                        DescriptorInput::Stdin
                    } else {
                        DescriptorInput::File(PathBuf::from(raw))
                    });
                }
                "--source" => source = Some(next_value(&mut args, &arg)?),
                "--schema" => schema = Some(PathBuf::from(next_value(&mut args, &arg)?)),
                "--no-schema" => no_schema = true,
                "--verbose" | "-v" => verbose = true,
                "--help" | "-h" => {
                    print!("{}", usage());
                    std::process::exit(0);
                }
                other => bail!("unknown flag: {other}"),
            }
        }

        let query = match category_query {
            Some(category) => {
                if descriptor_flags || descriptor_source.is_some() || source.is_some() {
                    bail!("--list-category cannot be combined with product query flags");
                }
                Query::Category(category)
            }
            None => {
                if descriptor_flags && descriptor_source.is_some() {
                    bail!("--descriptor cannot be combined with individual descriptor flags");
                }
                Query::Product {
                    descriptor: descriptor_source.unwrap_or(DescriptorInput::Flags(descriptor)),
                    source,
                }
            }
        };

        Ok(CliArgs {
            data_root,
            profiles,
            products,
            query,
            schema,
            no_schema,
            verbose,
        })
    }
}

fn next_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String> {
    args.next()
        .map(|os| {
            os.into_string()
                .map_err(|_| anyhow!("value for {flag} is not valid UTF-8"))
        })
        .transpose()?
        .ok_or_else(|| anyhow!("missing value for {flag}"))
}

fn usage() -> &'static str {
    "Usage: source-query [--data-root DIR] [--profiles FILE] [--product NAME[,NAME...]]\n\
                    [--list-category NAME|*]\n\
                    [--name NAME] [--category NAME] [--channel NAME] [--version SEMVER]\n\
                    [--language TAG]\n\
                    [--descriptor FILE|-] [--source NAME] [--schema FILE|--no-schema] [--verbose]\n\
Resolves the sources that apply to a product and prints one JSON object per match.\n"
}
