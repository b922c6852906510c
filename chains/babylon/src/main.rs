use anyhow::{Context, Result};
use babylon_sender::amount::{format_display, format_human, group_thousands};
use babylon_sender::config::{BabylonConfig, DEFAULT_CONFIG_PATH};
use babylon_sender::options::{self, DialoguerPrompter, NonInteractive, OptionInputs, Prompter};
use babylon_sender::planner::{self, BatchPlan};
use babylon_sender::wallet::{derive_all, WalletAccount};
use babylon_sender::{BatchExecutor, InstructionPayload, RpcConnector};
use clap::Parser;
use core_logic::{setup_logger, MnemonicManager, MnemonicSource, WalletLoader};
use dotenv::dotenv;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Babylon Sender - sequential cross-chain transfer batches from mnemonic wallets"
)]
struct Args {
    /// Path to config.toml (optional)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Mnemonic file, one phrase per line (overrides config)
    #[arg(short, long)]
    mnemonics: Option<String>,

    /// Number of wallets to use (default: all)
    #[arg(short, long)]
    wallets: Option<usize>,

    /// Transactions (single wallet) or rounds (multiple wallets)
    #[arg(short = 'n', long)]
    count: Option<u32>,

    /// Amount in BBN; repeat for per-transaction amounts in single-wallet mode
    #[arg(short, long)]
    amount: Vec<String>,

    /// Memo prefix
    #[arg(long)]
    memo: Option<String>,

    /// Pre-built 0x instruction payload used verbatim for every transaction
    #[arg(long)]
    instruction: Option<String>,

    /// Never prompt; unanswered questions take their defaults
    #[arg(short, long, default_value = "false")]
    yes: bool,

    /// Print the plan and exit without connecting
    #[arg(long, default_value = "false")]
    dry_run: bool,

    /// Write run metrics as JSON to this path
    #[arg(short, long)]
    export_metrics: Option<String>,
}

fn print_wallets(wallets: &[WalletAccount]) {
    println!("\n--- Wallets ---");
    for wallet in wallets {
        println!(
            "  {:>3}. {}  |  {}",
            wallet.index, wallet.primary_address, wallet.secondary_address
        );
    }
}

fn print_summary(plan: &BatchPlan) {
    println!("\n📋 Configuration Summary:");
    match plan.rounds() {
        Some(rounds) => {
            println!(
                "   • {} rounds × {} wallets = {} total transactions",
                rounds,
                plan.wallet_count(),
                plan.len()
            );
            if let Some(first) = plan.specs().first() {
                println!("   • {} per transaction", format_display(first.amount));
            }
        }
        None => {
            println!("   • {} transactions from wallet 1", plan.len());
            for (i, spec) in plan.specs().iter().enumerate() {
                println!("   • tx {}: {}", i + 1, format_display(spec.amount));
            }
        }
    }
    let total = plan.total_base_units();
    println!(
        "   • Total amount: {} BBN ({} ubbn)\n",
        format_human(total),
        group_thousands(total)
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();
    // Keep guard alive for file logging
    let _log_guard = setup_logger();

    let config = BabylonConfig::load(&args.config).context("Failed to load config")?;
    info!("Using RPC endpoint {}", config.rpc_endpoint);

    let source = match &args.mnemonics {
        Some(path) => MnemonicSource::File { path: path.clone() },
        None => config.mnemonic_source(),
    };
    let mnemonics = MnemonicManager::new(source)
        .load_wallets()
        .await
        .context("Failed to load mnemonics")?;

    let override_payload = args
        .instruction
        .as_deref()
        .map(InstructionPayload::from_hex)
        .transpose()
        .context("Invalid --instruction payload")?;
    if override_payload.is_some() {
        warn!("Using a pre-built instruction payload for every transaction");
    }

    let inputs = OptionInputs {
        wallets: args.wallets,
        count: args.count,
        amounts: args.amount.clone(),
        memo: args.memo.clone(),
    };
    let base_defaults = config.plan_defaults();
    let resolved = {
        let mut prompter: Box<dyn Prompter> = if args.yes {
            Box::new(NonInteractive)
        } else {
            Box::new(DialoguerPrompter::new())
        };
        options::resolve(&inputs, mnemonics.len(), &base_defaults, prompter.as_mut())?
    };

    let identities = derive_all(
        &mnemonics[..resolved.wallet_count],
        &config.address_prefix,
        &config.secondary_prefix,
    )
    .context("Failed to derive wallets")?;
    drop(mnemonics);

    let accounts: Vec<WalletAccount> = identities.iter().map(|id| id.account().clone()).collect();
    print_wallets(&accounts);

    let defaults = resolved.apply_to(&base_defaults);
    let plan = planner::plan(&accounts, &resolved.mode, &defaults, override_payload)?;
    print_summary(&plan);

    if args.dry_run {
        info!("Dry run: {} transaction(s) planned, nothing sent", plan.len());
        return Ok(());
    }

    let connector = RpcConnector::new(&config.chain_config(), identities)?;
    let mut executor = BatchExecutor::new(connector, config.executor_settings());

    println!("--- Starting Transaction Execution ---");
    let outcome = executor.run(plan.specs()).await;

    if let Some(path) = &args.export_metrics {
        match executor.metrics().export_to_file(path).await {
            Ok(()) => info!("Metrics exported to {}", path),
            Err(e) => error!("Failed to export metrics to {}: {}", path, e),
        }
    }

    let report = outcome.context("Batch aborted")?;
    let stats = report.stats();
    println!(
        "\n✅ All transactions completed! {} succeeded, {} failed ({:.1}%)",
        stats.success,
        stats.failed,
        stats.success_rate()
    );
    for record in report.failures() {
        if let babylon_sender::ExecutionResult::Failed { error } = &record.outcome {
            println!("   ❌ tx {} (wallet {}): {}", record.index, record.wallet_index, error);
        }
    }

    Ok(())
}
