#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;
extern crate pretty_env_logger;
extern crate cluster_fd;

use clap::{App, Arg};
use std::fs;
use std::io::Read;
use std::thread;
use std::time::Duration;

use cluster_fd::{config, Poller, SequencerMetrics, TcpRuntime};

fn main() {
    pretty_env_logger::init().expect("could not initialize logger");

    let opts = mk_app().get_matches();
    let config_path = opts.value_of(CONFIG_PATH_ARG).unwrap();
    let interval_secs: u64 = opts.value_of(INTERVAL_ARG)
        .unwrap()
        .parse()
        .expect("--interval must be an integer number of seconds");

    let config_str = {
        let mut s = String::new();
        fs::File::open(config_path)
            .unwrap_or_else(|e| panic!("could not open {}: {}", config_path, e))
            .read_to_string(&mut s)
            .expect("could not read configuration file");
        s
    };
    let cluster_config = config::from_str(&config_str).expect("configuration error");
    let layout = cluster_config.layout();
    let poller_config = cluster_config.poller_config().expect("invalid poller configuration");

    let poller = Poller::with_config(cluster_config.local_endpoint(), TcpRuntime::new, poller_config)
        .expect("could not start poller reactor");

    info!(
        "cluster-fd: polling {} server(s) at epoch {}, every {}s",
        layout.all_servers().len(),
        layout.epoch(),
        interval_secs
    );

    loop {
        match poller.poll(&layout, SequencerMetrics::unknown()) {
            Ok(report) => log_report(&report),
            Err(e) => {
                error!("poll() refused to run: {}", e);
                break;
            }
        }
        thread::sleep(Duration::from_secs(interval_secs));
    }
}

fn log_report(report: &cluster_fd::PollReport) {
    info!(
        "poll epoch={} responsive={} wrong_epochs={} reachable={} failed={} cluster_ready={}",
        report.poll_epoch(),
        report.responsive_servers().len(),
        report.wrong_epochs().len(),
        report.reachable_nodes().len(),
        report.failed_nodes().len(),
        report.cluster_state().is_ready()
    );
    for (endpoint, k) in report.wrong_epochs() {
        warn!("{} is at epoch {}, expected {}", endpoint, k, report.poll_epoch());
    }
}

static CONFIG_PATH_ARG: &'static str = "PATH";
static INTERVAL_ARG: &'static str = "interval";

fn mk_app() -> App<'static, 'static> {
    App::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .arg(Arg::with_name(CONFIG_PATH_ARG).required(true).index(1).help(
            "Cluster layout config file path.",
        ))
        .arg(
            Arg::with_name(INTERVAL_ARG)
                .long("interval")
                .takes_value(true)
                .default_value("5")
                .help("Seconds between poll rounds."),
        )
}
