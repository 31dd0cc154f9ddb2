use alloy::{
    primitives::U256,
    providers::Provider,
    transports::http::{Client, Http},
};
use anyhow::{anyhow, Result};
use clap::{Arg, ArgMatches, Command};
use contract_bindgen::abi::loader::load_compiler_output;
use contract_bindgen::abi::{signature, AbiFunction, CompilerOutput, FunctionKind};
use contract_bindgen::codegen::{generate_bindings, GeneratorOptions};
use contract_bindgen::config::Config;
use contract_bindgen::ethereum::provider::ProviderManager;
use contract_bindgen::ethereum::{codec, keccak256_hex, utils, AlloyDependencies};
use contract_bindgen::runtime::{
    Contract, EventDecoder, EventRegistry, Invoker, PayableCallOptions, Value,
};
use serde_json::{json, Value as Json};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Invocation {
    Call,
    Estimate,
    Send,
}

fn invocation_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("abi")
                .long("abi")
                .value_name("FILE")
                .required(true)
                .help("Compiler output, contract artifact or ABI array"),
        )
        .arg(
            Arg::new("address")
                .long("address")
                .value_name("ADDRESS")
                .required(true)
                .help("Deployed contract address"),
        )
        .arg(
            Arg::new("function")
                .short('f')
                .long("function")
                .value_name("NAME")
                .required(true)
                .help("Function to invoke"),
        )
        .arg(
            Arg::new("contract")
                .long("contract")
                .value_name("NAME")
                .help("Contract to take the function from when the ABI file holds several"),
        )
        .arg(
            Arg::new("args")
                .long("args")
                .value_name("JSON")
                .help("Arguments as a JSON array in input order, or an object keyed by input name"),
        )
        .arg(
            Arg::new("sender")
                .long("sender")
                .value_name("ADDRESS")
                .help("Sender address (defaults to the node's first account)"),
        )
        .arg(
            Arg::new("value")
                .long("value")
                .value_name("WEI")
                .help("Ether to attach to a payable function, in wei"),
        )
}

fn build_cli() -> Command {
    Command::new("contract-bindgen")
        .version("0.1.0")
        .about("Typed Rust bindings and ABI-driven calls for Ethereum smart contracts")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("Path to configuration file"),
        )
        .arg(
            Arg::new("network")
                .short('n')
                .long("network")
                .value_name("NETWORK")
                .global(true)
                .help("Network to use (local, ethereum, sepolia or any configured name)"),
        )
        .arg(
            Arg::new("rpc-url")
                .short('r')
                .long("rpc-url")
                .value_name("URL")
                .global(true)
                .help("RPC endpoint URL"),
        )
        .arg(
            Arg::new("allow-writes")
                .long("allow-writes")
                .global(true)
                .help("Allow write operations (transactions)")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .help("Generate a sample configuration file and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config-path")
                .long("config-path")
                .help("Print the default configuration file path and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("generate")
                .about("Generate Rust bindings from compiler output")
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .value_name("FILE")
                        .required(true)
                        .help("Compiler output, contract artifact or ABI array"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Where to write the bindings (stdout when omitted)"),
                )
                .arg(
                    Arg::new("runtime-crate")
                        .long("runtime-crate")
                        .value_name("NAME")
                        .help("Crate path the bindings import the runtime from"),
                ),
        )
        .subcommand(
            Command::new("signatures")
                .about("Print function selectors and event topics")
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .value_name("FILE")
                        .required(true)
                        .help("Compiler output, contract artifact or ABI array"),
                ),
        )
        .subcommand(invocation_args(
            Command::new("call").about("Execute a function locally and print its outputs"),
        ))
        .subcommand(invocation_args(
            Command::new("estimate").about("Estimate the gas a transaction would use"),
        ))
        .subcommand(invocation_args(
            Command::new("send").about("Submit a transaction and print the events it emitted"),
        ))
        .subcommand(
            Command::new("decode-receipt")
                .about("Fetch a mined receipt and decode its logs")
                .arg(
                    Arg::new("abi")
                        .long("abi")
                        .value_name("FILE")
                        .required(true)
                        .help("Compiler output, contract artifact or ABI array"),
                )
                .arg(
                    Arg::new("tx")
                        .long("tx")
                        .value_name("HASH")
                        .required(true)
                        .help("Transaction hash"),
                ),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so generated code and JSON results can be piped
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let matches = build_cli().get_matches();

    if matches.get_flag("generate-config") {
        println!("{}", Config::generate_sample());
        return Ok(());
    }

    if matches.get_flag("config-path") {
        match Config::default_config_path() {
            Ok(path) => {
                println!("{}", path.display());
                return Ok(());
            }
            Err(e) => {
                error!("Could not determine default config path: {}", e);
                return Err(e);
            }
        }
    }

    let config_path = matches.get_one::<String>("config").map(|s| s.as_str());
    let mut config = Config::load_or_default(config_path).await;

    if let Some(network) = matches.get_one::<String>("network") {
        config.default_network = network.clone();
    }

    if let Some(rpc_url) = matches.get_one::<String>("rpc-url") {
        config.override_rpc_url(None, rpc_url.clone());
    }

    if matches.get_flag("allow-writes") {
        config.security.allow_write_operations = true;
    }

    let result = match matches.subcommand() {
        Some(("generate", sub)) => generate(&config, sub).await,
        Some(("signatures", sub)) => signatures(sub).await,
        Some(("call", sub)) => invoke(config, sub, Invocation::Call).await,
        Some(("estimate", sub)) => invoke(config, sub, Invocation::Estimate).await,
        Some(("send", sub)) => invoke(config, sub, Invocation::Send).await,
        Some(("decode-receipt", sub)) => decode_receipt(config, sub).await,
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(|s| s.as_str())
        .ok_or_else(|| anyhow!("Missing required argument --{}", name))
}

async fn generate(config: &Config, matches: &ArgMatches) -> Result<()> {
    let input = required(matches, "input")?;
    let output = load_compiler_output(input).await?;

    let runtime_crate = matches
        .get_one::<String>("runtime-crate")
        .cloned()
        .unwrap_or_else(|| config.generator.runtime_crate.clone());
    let options = GeneratorOptions::with_runtime_crate(runtime_crate);

    let source = generate_bindings(&output, &options, keccak256_hex)?;

    let destination = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .or_else(|| config.generator.output.clone());

    match destination {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await.map_err(|e| {
                        anyhow!("Failed to create output directory {:?}: {}", parent, e)
                    })?;
                }
            }
            tokio::fs::write(&path, source)
                .await
                .map_err(|e| anyhow!("Failed to write bindings to {:?}: {}", path, e))?;
            info!("Wrote bindings to {}", path.display());
        }
        None => print!("{}", source),
    }
    Ok(())
}

async fn signatures(matches: &ArgMatches) -> Result<()> {
    let output = load_compiler_output(required(matches, "input")?).await?;

    for (_, name, contract) in output.non_empty_contracts() {
        println!("{}", name);
        for function in contract.functions().filter(|f| f.kind == FunctionKind::Function) {
            println!(
                "  {}  {}",
                signature::selector(keccak256_hex, function)?,
                signature::function_signature(function)?
            );
        }
        for event in contract.events() {
            println!(
                "  {}  {}",
                signature::topic_hash(keccak256_hex, event)?,
                signature::event_signature(event)?
            );
        }
    }
    Ok(())
}

/// First function called `name`, in `contract` if given, else in any contract.
fn find_function<'a>(
    output: &'a CompilerOutput,
    contract: Option<&str>,
    name: &str,
) -> Result<&'a AbiFunction> {
    utils::check_function_name(name)?;

    let candidates: Vec<&AbiFunction> = match contract {
        Some(contract) => output
            .find_contract(contract)
            .ok_or_else(|| anyhow!("Contract '{}' not found in ABI file", contract))?
            .functions()
            .collect(),
        None => output
            .non_empty_contracts()
            .flat_map(|(_, _, contract)| contract.functions())
            .collect(),
    };

    let mut matching = candidates
        .into_iter()
        .filter(|f| f.kind == FunctionKind::Function && f.name == name);
    let function = matching
        .next()
        .ok_or_else(|| anyhow!("Function '{}' not found in ABI file", name))?;
    if matching.next().is_some() {
        warn!(
            "Function {} is overloaded, using {}",
            name,
            signature::function_signature(function)?
        );
    }
    Ok(function)
}

async fn invoke(config: Config, matches: &ArgMatches, invocation: Invocation) -> Result<()> {
    if invocation == Invocation::Send && !config.security.allow_write_operations {
        return Err(anyhow!(
            "Write operations are disabled. Pass --allow-writes or set security.allow_write_operations = true"
        ));
    }

    let output = load_compiler_output(required(matches, "abi")?).await?;
    let address = utils::parse_address(required(matches, "address")?)?;
    let contract_name = matches.get_one::<String>("contract").map(|s| s.as_str());
    let function = find_function(&output, contract_name, required(matches, "function")?)?;

    let arguments: Json = match matches.get_one::<String>("args") {
        Some(text) => serde_json::from_str(text)
            .map_err(|e| anyhow!("--args must be valid JSON: {}", e))?,
        None => Json::Null,
    };
    let arguments = codec::json_arguments(function, &arguments)?;

    let mut options = PayableCallOptions::default();
    if let Some(sender) = matches.get_one::<String>("sender") {
        let sender = utils::parse_address(sender)?;
        options = options.with_sender(format!("0x{:x}", sender));
    }
    if let Some(value) = matches.get_one::<String>("value") {
        if !function.is_payable() {
            return Err(anyhow!("Function '{}' is not payable", function.name));
        }
        options = options.with_attached_eth(utils::parse_amount(value)?);
    }

    let registry = Arc::new(EventRegistry::from_compiler_output(keccak256_hex, &output)?);
    let manager = ProviderManager::new(config.clone())?;
    manager.validate_network_connection(None).await?;
    let network_config = manager.get_network_config(None)?;
    info!("Using network {}", config.default_network);

    let address = format!("0x{:x}", address);
    let result = if invocation == Invocation::Send {
        let (provider, signer) =
            manager.signing_provider(None, &config.private_key()?)?;
        let dependencies = AlloyDependencies::new(provider).with_default_sender(signer);
        dispatch(dependencies, address, registry, function, arguments, options, invocation).await?
    } else {
        let mut dependencies = AlloyDependencies::new(manager.get_provider(None)?.clone());
        if let Some(sender) = &network_config.default_sender {
            dependencies = dependencies.with_default_sender(utils::parse_address(sender)?);
        }
        dispatch(dependencies, address, registry, function, arguments, options, invocation).await?
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn dispatch<P>(
    dependencies: AlloyDependencies<P>,
    address: String,
    registry: Arc<EventRegistry>,
    function: &AbiFunction,
    arguments: Vec<Value<U256>>,
    options: PayableCallOptions<U256>,
    invocation: Invocation,
) -> Result<Json>
where
    P: Provider<Http<Client>> + 'static,
{
    let contract = Contract::new(Arc::new(dependencies), address, registry);
    let tx_name = function.name.as_str();

    match invocation {
        Invocation::Call => {
            let values = contract.local_call(function, arguments, options).await?;
            codec::outputs_to_json(&function.outputs, &values)
        }
        Invocation::Estimate => {
            let gas = contract
                .estimate_gas(function, arguments, tx_name, options)
                .await?;
            Ok(json!({ "gas": gas.to_string() }))
        }
        Invocation::Send => {
            let events = contract
                .remote_call(function, arguments, tx_name, options)
                .await?;
            info!("{} succeeded with {} decoded event(s)", tx_name, events.len());
            Ok(Json::Array(events.iter().map(codec::event_to_json).collect()))
        }
    }
}

async fn decode_receipt(config: Config, matches: &ArgMatches) -> Result<()> {
    let output = load_compiler_output(required(matches, "abi")?).await?;
    let registry = EventRegistry::from_compiler_output(keccak256_hex, &output)?;

    let manager = ProviderManager::new(config)?;
    manager.validate_network_connection(None).await?;
    let dependencies = AlloyDependencies::new(manager.get_provider(None)?.clone());
    let receipt = dependencies.receipt(required(matches, "tx")?).await?;

    let decoder = EventDecoder::new(&registry, &dependencies);
    let events = decoder.decode_all(&receipt.logs)?;
    info!(
        "Decoded {} of {} log(s)",
        events.len(),
        receipt.logs.len()
    );

    let result = json!({
        "status": receipt.status,
        "events": events.iter().map(codec::event_to_json).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
