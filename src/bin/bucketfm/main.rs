use bucketfm::{
    config::{BucketConfig, DEFAULT_DOMAIN, DEFAULT_PAGE_SIZE},
    logging::{init_logging, LogLevel, LogTarget},
    providers::{http::HttpTransport, s3::S3Provider},
    report::listing_report,
    screens::{BrowserScreen, Event, Flow},
    utils::normalize_prefix,
};
use clap::Parser;
use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyModifiers},
    execute,
    terminal::{enable_raw_mode, EnterAlternateScreen},
};
use std::{
    error::Error,
    io::{self, Stdout},
    path::PathBuf,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info};
use tui::{backend::CrosstermBackend, Terminal};

fn spawn_sender(tx: UnboundedSender<Event>) {
    let tick_rate = Duration::from_millis(250);

    thread::spawn(move || {
        let mut last_tick = Instant::now();

        loop {
            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_secs(0));

            match event::poll(timeout) {
                Ok(true) => match event::read() {
                    Ok(CEvent::Key(key)) => {
                        let event = if key.code == KeyCode::Char('c')
                            && key.modifiers.contains(KeyModifiers::CONTROL)
                        {
                            Event::Shutdown
                        } else {
                            Event::Input(key)
                        };
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    Ok(_) => (),
                    Err(err) => {
                        error!(error = %err, "couldn't read terminal event");
                        let _ = tx.send(Event::Shutdown);
                        break;
                    }
                },
                Ok(false) => (),
                Err(err) => {
                    error!(error = %err, "couldn't poll terminal events");
                    let _ = tx.send(Event::Shutdown);
                    break;
                }
            }

            if last_tick.elapsed() >= tick_rate {
                if tx.send(Event::Tick).is_err() {
                    break;
                }
                last_tick = Instant::now();
            }
        }
    });
}

fn capture_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

async fn event_loop(
    screen: &mut BrowserScreen<CrosstermBackend<Stdout>, HttpTransport>,
    events: &mut UnboundedReceiver<Event>,
) -> Result<(), Box<dyn Error>> {
    screen.render()?;
    while let Some(event) = events.recv().await {
        match event {
            Event::Input(key) => {
                if screen.handle_event(key) == Flow::Quit {
                    break;
                }
            }
            Event::Shutdown => break,
            Event::Tick => (),
            Event::Listed(listed) => screen.apply_listing(listed),
        }
        screen.render()?;
    }
    Ok(())
}

async fn browse(
    config: BucketConfig,
    provider: Arc<S3Provider<HttpTransport>>,
    start_path: &str,
) -> Result<(), Box<dyn Error>> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let terminal = capture_terminal()?;
    let mut screen = BrowserScreen::new(terminal, config, provider, tx.clone(), start_path);
    spawn_sender(tx);
    screen.refresh();

    let result = event_loop(&mut screen, &mut rx).await;
    screen.shutdown()?;
    result
}

async fn print_listing(
    config: &BucketConfig,
    provider: &S3Provider<HttpTransport>,
    path: &str,
    query: &str,
    page: usize,
) -> Result<(), Box<dyn Error>> {
    for line in listing_report(provider, path, query, page, config.page_size).await? {
        println!("{}", line);
    }
    Ok(())
}

/// bucketfm - browse a public S3 bucket from the terminal
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about=None)]
struct Args {
    /// Name of the bucket you want to browse
    #[clap(long, short, env = "BUCKETFM_BUCKET")]
    bucket_name: String,
    /// Storage domain the bucket is served from
    #[clap(long, env = "BUCKETFM_DOMAIN", default_value = DEFAULT_DOMAIN)]
    domain: String,
    /// Scheme of the bucket endpoint, "http" or "https"
    #[clap(long, default_value = "https")]
    scheme: String,
    /// Prefix to start in, e.g. "docs/"
    #[clap(long)]
    prefix: Option<String>,
    /// Number of rows per page
    #[clap(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,
    /// Additional key to hide from listings, can be repeated
    #[clap(long)]
    exclude: Vec<String>,
    /// Show the files of the hosted listing page (index.html, s3.js, ...)
    #[clap(long)]
    show_site_files: bool,
    /// Print one page of the listing and exit
    #[clap(long)]
    print: bool,
    /// Only list entries whose name contains this text (with --print)
    #[clap(long)]
    search: Option<String>,
    /// Page to print (with --print)
    #[clap(long, default_value_t = 1)]
    page: usize,
    /// File to write logs to
    #[clap(long, parse(from_os_str))]
    log_file: Option<PathBuf>,
    #[clap(long, arg_enum, default_value = "info")]
    log_level: LogLevel,
}

impl Args {
    fn config(&self) -> Result<BucketConfig, Box<dyn Error>> {
        Ok(BucketConfig::new(&self.bucket_name, &self.domain)
            .with_scheme(&self.scheme)
            .with_page_size(self.page_size)
            .with_excluded_keys(self.exclude.iter().cloned(), !self.show_site_files)
            .validate()?)
    }
}

pub async fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let log_target = match (&args.log_file, args.print) {
        (Some(path), _) => LogTarget::File(path),
        (None, true) => LogTarget::Stderr,
        (None, false) => LogTarget::Disabled,
    };
    init_logging(log_target, args.log_level)?;

    let config = args.config()?;
    let start_path = normalize_prefix(args.prefix.as_deref().unwrap_or(""));
    info!(
        bucket = %config.bucket_name,
        endpoint = %config.endpoint(),
        prefix = %start_path,
        "starting"
    );
    let provider = Arc::new(S3Provider::new(
        &config.bucket_name,
        HttpTransport::new(&config),
        config.excluded_keys.clone(),
    ));

    if args.print {
        print_listing(
            &config,
            &provider,
            &start_path,
            args.search.as_deref().unwrap_or(""),
            args.page,
        )
        .await
    } else {
        browse(config, provider, &start_path).await
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    run().await?;
    Ok(())
}
