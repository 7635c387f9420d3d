use cardwise_client::commands::{hint, history, recommend, record, reset, rules, usage};
use cardwise_client::config::ConfigOverrides;
use cardwise_client::{ClientResult, SuccessEnvelope};

use crate::cli::{Cli, Commands};

pub fn dispatch(cli: &Cli) -> ClientResult<SuccessEnvelope> {
    let config = ConfigOverrides {
        rules_path: cli.rules.as_deref(),
        merchant_map_path: cli.merchant_map.as_deref(),
        ..ConfigOverrides::default()
    };

    match &cli.command {
        Commands::Recommend {
            merchant,
            amount,
            region,
            date,
            ..
        } => recommend::run_with_options(recommend::RecommendOptions {
            merchant,
            amount: *amount,
            region: region.as_deref(),
            date: date.as_ref().map(|value| value.as_str()),
            config,
        }),
        Commands::Record { rec_id, .. } => record::run_with_options(record::RecordOptions {
            rec_id: rec_id.as_deref(),
            config,
        }),
        Commands::History { month, .. } => history::run_with_options(history::HistoryOptions {
            month: month.as_ref().map(|value| value.as_str()),
            config,
        }),
        Commands::Usage { month, .. } => usage::run_with_options(usage::UsageOptions {
            month: month.as_ref().map(|value| value.as_str()),
            config,
        }),
        Commands::Reset { month, .. } => reset::run_with_options(reset::ResetOptions {
            month: month.as_str(),
            config,
        }),
        Commands::Rules { .. } => rules::run_with_options(rules::RulesOptions { config }),
        Commands::Hint { merchant, .. } => {
            hint::run_with_options(hint::HintOptions { merchant, config })
        }
    }
}
