// Simple dig style command line.
// dig [@server] [+udp|+tcp|+dot|+doh] [+https=URL] [+timeout=MS] [TYPE] NAME
use log::debug;
use std::env;
use std::net::IpAddr;
use std::process;
use std::str::FromStr;
use std::time::Duration;
use stubdns::{Config, Request, Resolver, Transport, Type};

// A simple type alias so as to DRY.
type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

const USAGE: &str = "Usage: dig [@server] [+udp|+tcp|+dot|+doh] [+https=URL] [+timeout=MS] [TYPE] NAME";

#[derive(Debug, PartialEq)]
struct Args {
    transport: Transport,
    server: Option<IpAddr>,
    doh_url: Option<String>,
    timeout: Option<Duration>,

    /// Query this type
    r#type: Type,

    /// for this name.
    name: String,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Args> {
    let mut result = Args {
        transport: Transport::Udp,
        server: None,
        doh_url: None,
        timeout: None,

        r#type: Type::A,
        name: String::new(),
    };

    let mut type_or_name = Vec::<String>::new();

    for arg in args {
        match arg.as_str() {
            "+udp" => result.transport = Transport::Udp,
            "+tcp" => result.transport = Transport::Tcp,
            "+dot" | "+tls" => result.transport = Transport::Dot,
            "+doh" => result.transport = Transport::Doh,

            _ => {
                if let Some(url) = arg.strip_prefix("+https=") {
                    result.transport = Transport::Doh;
                    result.doh_url = Some(url.to_string());
                } else if let Some(ms) = arg.strip_prefix("+timeout=") {
                    let ms: u64 = ms
                        .parse()
                        .map_err(|_| format!("Invalid timeout: {}", ms))?;
                    result.timeout = Some(Duration::from_millis(ms));
                } else if arg.starts_with('+') {
                    return Err(format!("Unknown flag: {}", arg).into());
                } else if let Some(server) = arg.strip_prefix('@') {
                    let server = server
                        .parse()
                        .map_err(|_| format!("Server must be an IP address: {}", server))?;
                    result.server = Some(server);
                } else {
                    type_or_name.push(arg)
                }
            }
        }
    }

    let mut found_type = false;

    // To be useful, we allow users to say `dig A bramp.net` or `dig bramp.net A`
    for arg in type_or_name {
        if !found_type {
            if let Ok(r#type) = Type::from_str(&arg) {
                result.r#type = r#type;
                found_type = true;
                continue;
            }
        }

        if !result.name.is_empty() {
            return Err(format!(
                "Only one name may be given, found {} and {}",
                result.name, arg
            )
            .into());
        }
        result.name = arg;
    }

    if result.name.is_empty() {
        // By default query the root domain
        result.name = ".".to_string();
        if !found_type {
            result.r#type = Type::NS;
        }
    }

    Ok(result)
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };
    debug!("{:?}", args);

    let mut config = Config::default();
    if let Some(timeout) = args.timeout {
        config = config.with_timeout(timeout).with_doh_timeout(timeout);
    }

    let mut request = Request::new(&args.name, args.r#type).with_transport(args.transport);
    request.server = args.server;
    request.doh_url = args.doh_url;

    match Resolver::new(config).resolve(&request).await {
        Ok(response) => print!("{}", response),
        Err(e) => {
            eprintln!(";; {}", e);
            process::exit(1);
        }
    }
}
