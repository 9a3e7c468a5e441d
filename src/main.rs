use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;
use wintoast::{
    AudioOption, AudioSystemFile, Duration as ToastDuration, Scenario, ShortcutPolicy,
    TemplateType, TextField, ToastBackend, ToastConfig, ToastManager, ToastTemplate,
    config::LogLevel, logging, xml::ToastXml,
};

/// Show a Windows toast notification and print what happens to it
#[derive(Parser, Debug)]
#[command(name = "wintoast-demo", version)]
struct Cli {
    /// Configuration file (defaults to <config dir>/wintoast/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Template layout, e.g. Text02 or ImageAndText04
    #[arg(long, default_value = "Text02")]
    template: String,

    /// Text line, repeat for the second and third line
    #[arg(long = "line")]
    lines: Vec<String>,

    /// Image shown by the ImageAndText templates
    #[arg(long)]
    image: Option<String>,

    /// Button label, repeat to add more buttons
    #[arg(long = "action")]
    actions: Vec<String>,

    /// Built-in sound (e.g. Mail, Alarm3) or a custom sound path
    #[arg(long)]
    audio: Option<String>,

    #[arg(long, conflicts_with = "looping")]
    silent: bool,

    #[arg(long = "loop")]
    looping: bool,

    /// system, short or long
    #[arg(long, default_value = "system")]
    duration: String,

    /// default, alarm, incoming-call or reminder
    #[arg(long, default_value = "default")]
    scenario: String,

    /// Milliseconds until the toast expires, 0 for never
    #[arg(long, default_value_t = 0)]
    expire_ms: i64,

    /// Seconds to wait for events before clearing the toast
    #[arg(long, default_value_t = 15)]
    wait_secs: u64,

    /// ignore, require-no-create or require-create (overrides the config file)
    #[arg(long)]
    shortcut_policy: Option<String>,

    /// trace, debug, info, warn or error (overrides the config file)
    #[arg(long)]
    log_level: Option<String>,
}

fn parse_duration(value: &str) -> Result<ToastDuration> {
    match value.to_ascii_lowercase().as_str() {
        "system" => Ok(ToastDuration::System),
        "short" => Ok(ToastDuration::Short),
        "long" => Ok(ToastDuration::Long),
        other => bail!("Unknown duration: {other}"),
    }
}

fn parse_scenario(value: &str) -> Result<Scenario> {
    match value.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
        "default" => Ok(Scenario::Default),
        "alarm" => Ok(Scenario::Alarm),
        "incomingcall" => Ok(Scenario::IncomingCall),
        "reminder" => Ok(Scenario::Reminder),
        other => bail!("Unknown scenario: {other}"),
    }
}

fn build_template(cli: &Cli) -> Result<ToastTemplate> {
    let template_type = TemplateType::from_str(&cli.template)
        .with_context(|| format!("Unknown template: {}", cli.template))?;
    let mut template = ToastTemplate::new(template_type);

    let fields = [TextField::FirstLine, TextField::SecondLine, TextField::ThirdLine];
    if cli.lines.len() > template.text_fields_count() {
        bail!(
            "{} takes at most {} lines",
            template_type.as_str(),
            template.text_fields_count()
        );
    }
    for (line, field) in cli.lines.iter().zip(fields) {
        template.set_text_field(line.clone(), field);
    }

    if let Some(image) = &cli.image {
        template.set_image_path(image.clone());
    }
    for action in &cli.actions {
        template.add_action(action.clone());
    }

    match cli.audio.as_deref().map(|a| (a, AudioSystemFile::from_str(a))) {
        Some((_, Some(sound))) => {
            template.set_audio_system_file(sound);
        }
        Some((path, None)) => {
            template.set_audio_path(path);
        }
        None => {}
    }
    if cli.silent {
        template.set_audio_option(AudioOption::Silent);
    } else if cli.looping {
        template.set_audio_option(AudioOption::Loop);
    }

    template
        .set_duration(parse_duration(&cli.duration)?)
        .set_scenario(parse_scenario(&cli.scenario)?)
        .set_expiration(cli.expire_ms);

    Ok(template)
}

async fn run<B: ToastBackend>(
    mut manager: ToastManager<B>,
    config: &ToastConfig,
    template: &ToastTemplate,
    wait_secs: u64,
) -> Result<()> {
    config.apply(&mut manager);
    manager
        .initialize()
        .context("Failed to initialize toast manager")?;

    if !cfg!(windows) {
        let xml = ToastXml::build(template, manager.is_supporting_modern_features())
            .to_xml()
            .context("Failed to render toast xml")?;
        println!("{xml}");
    }

    let mut events = manager.subscribe();
    let id = manager.show_toast(template).context("Failed to show toast")?;
    tracing::info!(target: "main", id, wait_secs, "Toast shown, waiting for events");

    let deadline = tokio::time::sleep(std::time::Duration::from_secs(wait_secs));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(target: "main", "Interrupted");
                break;
            }
            event = events.recv() => match event {
                Ok(event) => println!("{}", serde_json::to_string(&event)?),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(target: "main", skipped, "Event receiver lagged");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    manager.clear();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => ToastConfig::default_path()?,
    };
    let mut config = ToastConfig::load_from_path(&config_path)?;
    if let Some(policy) = &cli.shortcut_policy {
        config.shortcut_policy = ShortcutPolicy::from_str(policy)
            .with_context(|| format!("Unknown shortcut policy: {policy}"))?;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = LogLevel::from_str(level);
    }

    // Keep the guard alive for the entire application lifetime
    let _log_guard = logging::init_logging(config.log_config())
        .context("Failed to initialize logging system")?;

    let template = build_template(&cli)?;

    #[cfg(windows)]
    let backend = wintoast::backend::WinRtBackend::new();
    #[cfg(not(windows))]
    let backend = wintoast::backend::MemoryBackend::new();

    run(ToastManager::new(backend), &config, &template, cli.wait_secs).await
}
