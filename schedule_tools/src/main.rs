use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use schedule_manager_lib::{
    application::{
        calendar_surface::{CalendarRegistry, CalendarSlot, CalendarSurface},
        commands,
        dto::to_calendar_events,
    },
    config::{ScheduleConfig, SheetConfig, DEFAULT_DATABASE_URL, DEFAULT_SHEET_RANGE},
    domain::{
        schedule_model::{MonthKey, VersionRef, DEFAULT_HISTORY_LIMIT},
        shift_record::ShiftRecord,
    },
    error::{CommandError, FetchError},
    infrastructure::row_source::{parse_rows, JsonFileRowSource, RowSource},
    sheets_row_source, ScheduleServices,
};

mod table_surface;

use table_surface::TableSurface;

// 引数を構造体として定義します
#[derive(Parser)]
#[command(name = "schedule_tools")]
#[command(version = "0.1.0")]
#[command(about = "公開シフト (月ごとのバージョン) を操作します", long_about = None)]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StoreArgs {
    /// sqlx の接続文字列
    #[arg(long, env = "SCHEDULE_DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database_url: String,

    /// 月ごとに残す過去バージョンの数
    #[arg(long, env = "SCHEDULE_HISTORY_LIMIT", default_value_t = DEFAULT_HISTORY_LIMIT)]
    history_limit: usize,
}

/// 行データの取得元。--rows がなければ Google Sheets を使う
#[derive(Args)]
struct SourceArgs {
    /// 行データの JSON ファイル
    #[arg(long)]
    rows: Option<PathBuf>,

    #[arg(long, env = "SCHEDULE_SHEETS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "SCHEDULE_SHEET_ID")]
    sheet_id: Option<String>,

    #[arg(long, env = "SCHEDULE_SHEET_RANGE", default_value = DEFAULT_SHEET_RANGE)]
    range: String,
}

impl SourceArgs {
    fn sheet_config(&self) -> Option<SheetConfig> {
        match (&self.api_key, &self.sheet_id) {
            (Some(api_key), Some(sheet_id)) => {
                Some(SheetConfig::new(api_key, sheet_id).with_range(&self.range))
            }
            _ => None,
        }
    }

    /// --rows のファイルを優先し、なければ設定の Google Sheets を使う
    fn row_source(&self, config: &ScheduleConfig) -> Result<Box<dyn RowSource>, FetchError> {
        if let Some(path) = &self.rows {
            return Ok(Box::new(JsonFileRowSource::new(path)));
        }
        sheets_row_source(config)
            .map(|source| Box::new(source) as Box<dyn RowSource>)
            .ok_or(FetchError::NotConfigured(
                "pass --rows or set SCHEDULE_SHEETS_API_KEY and SCHEDULE_SHEET_ID",
            ))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// 取得元から指定月を取り込んで公開します
    Publish {
        /// 対象月 (YYYY-MM)
        month: MonthKey,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// 公開中の月と履歴のある月を一覧します
    Months,

    /// 指定月のバージョン履歴を表示します
    History {
        month: MonthKey,

        #[arg(long)]
        json: bool,
    },

    /// 指定月のバージョンを表示します (--index なしで現在のバージョン)
    Show {
        month: MonthKey,

        /// 履歴のインデックス (0 が最も新しい過去バージョン)
        #[arg(short, long)]
        index: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// 公開せずに取得元の行を評価して表示します
    Evaluate {
        #[command(flatten)]
        source: SourceArgs,

        /// 指定した月だけを表示
        #[arg(short, long)]
        month: Option<MonthKey>,
    },

    /// 公開中・履歴の全データを削除します
    Clear {
        /// 確認なしで削除する
        #[arg(long)]
        yes: bool,
    },
}

impl Cli {
    fn config(&self) -> ScheduleConfig {
        let sheet = match &self.command {
            Commands::Publish { source, .. } | Commands::Evaluate { source, .. } => {
                source.sheet_config()
            }
            _ => None,
        };
        ScheduleConfig {
            database_url: self.store.database_url.clone(),
            history_limit: self.store.history_limit,
            sheet,
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(error) => tracing::error!(%error, "failed to format output as JSON"),
    }
}

async fn publish(
    services: &ScheduleServices,
    config: &ScheduleConfig,
    month: MonthKey,
    source: &SourceArgs,
) -> Result<(), CommandError> {
    let rows = source.row_source(config)?;
    let mut buffer = commands::load_editing_buffer(services).await;

    let summary = commands::import_month(rows.as_ref(), &mut buffer, month).await?;
    let snapshot = commands::publish_month(services, &buffer, month).await?;

    println!(
        "公開しました: {} ({} 日取り込み, {} 日公開)",
        snapshot.version,
        summary.imported,
        snapshot.events.len()
    );
    Ok(())
}

async fn months(services: &ScheduleServices) {
    let published = commands::published_months(services).await;
    let with_versions = commands::history_months(services).await;

    println!("📅 公開中:");
    if published.is_empty() {
        println!("   (なし)");
    }
    for month in &published {
        println!("   ┣ {} ({})", month, month.label());
    }

    println!("📋 バージョンのある月 (新しい順):");
    for month in &with_versions {
        println!("   ┣ {}", month);
    }
}

async fn show(
    services: &ScheduleServices,
    month: MonthKey,
    index: Option<usize>,
    json: bool,
) -> Result<(), CommandError> {
    let version = index.map_or(VersionRef::Current, VersionRef::History);
    let Some(view) = commands::view_version(services, month, version).await else {
        println!("{} にはそのバージョンがありません", month.label());
        return Ok(());
    };

    if json {
        print_json(&view);
        return Ok(());
    }

    let slot = match version {
        VersionRef::Current => CalendarSlot::Published,
        VersionRef::History(_) => CalendarSlot::Version,
    };
    let mut registry = CalendarRegistry::new();
    registry.set(slot, Box::new(TableSurface::new(view.summary.version.clone())));
    registry.show_month(slot, month, &view.events);

    if !view.changed_dates.is_empty() {
        println!("前のバージョンからの変更: {}", view.changed_dates.join(", "));
    }
    registry.destroy_all();
    Ok(())
}

async fn evaluate(
    config: &ScheduleConfig,
    source: &SourceArgs,
    month: Option<MonthKey>,
) -> Result<(), CommandError> {
    let rows = source.row_source(config)?.fetch_rows().await?;
    let records: Vec<ShiftRecord> = parse_rows(&rows)
        .into_iter()
        .filter(|record| month.map_or(true, |month| month.contains(&record.date)))
        .collect();

    let title = month.map_or_else(|| "取得元の全行".to_owned(), |month| month.label());
    let mut surface = TableSurface::new(title);
    surface.render(&to_calendar_events(&records, &HashSet::new()));
    Ok(())
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    let config = cli.config();

    // 取得元だけを使うコマンドは DB に接続しない
    if let Commands::Evaluate { source, month } = &cli.command {
        return evaluate(&config, source, *month).await;
    }

    let services = ScheduleServices::connect(&config).await?;

    match cli.command {
        Commands::Publish { month, source } => publish(&services, &config, month, &source).await,
        Commands::Months => {
            months(&services).await;
            Ok(())
        }
        Commands::History { month, json } => {
            let listing = commands::history_listing(&services, month).await;
            if json {
                print_json(&listing);
            } else {
                table_surface::show_history(&listing);
            }
            Ok(())
        }
        Commands::Show { month, index, json } => show(&services, month, index, json).await,
        Commands::Evaluate { .. } => Ok(()),
        Commands::Clear { yes } => {
            commands::clear_all_schedule_data(&services, yes).await?;
            println!("全ての公開データと履歴を削除しました");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandError::NotConfirmed) => {
            eprintln!("削除するには --yes を指定してください");
            ExitCode::FAILURE
        }
        Err(error) => {
            tracing::error!(%error, "command failed");
            ExitCode::FAILURE
        }
    }
}
