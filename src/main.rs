
use clap::Parser;
use rawcurl::{
    args::Args,
    client::{Client, Method, Protocol},
    http::{url, HttpResponse},
    output::print_response,
};
use std::process;

/// Body sent with POST, PUT and UPDATE.
const SAMPLE_BODY: &str = "key=value&param=123";

/// rawcurl - A minimal HTTP(S) client
fn main() {
    // Parse command line arguments; usage errors exit here
    let args = Args::parse();
    init_logging(args.verbose);

    if args.dump_url {
        print!("{}", url::parse(&args.url).describe());
        return;
    }

    let client = Client::new(args.client_config());

    if let Some(command) = &args.command {
        run_command(&client, &args.url, command);
        return;
    }

    for method in Method::ALL {
        let body = method.takes_body().then_some(SAMPLE_BODY);
        // A failed request has already been logged; move on to the next one.
        if let Ok(response) = client.request(method, &args.url, body) {
            print_or_exit(method.as_str(), &response);
        }
    }
}

fn run_command(client: &Client, target: &str, command: &str) {
    let scheme = url::parse(target).scheme.unwrap_or_default();
    let protocol = match Protocol::from_scheme(&scheme) {
        Some(protocol @ (Protocol::Ftp | Protocol::Telnet | Protocol::Ssh)) => protocol,
        _ => {
            eprintln!("Error: --command needs an ftp://, telnet:// or ssh:// URL");
            process::exit(1);
        }
    };

    match client.raw_request(protocol, target, command) {
        Ok(response) => print_or_exit(protocol.name(), &response),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    }
}

fn print_or_exit(label: &str, response: &HttpResponse) {
    if let Err(err) = print_response(label, response) {
        eprintln!("Output error: {}", err);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
