use confect::{instantiate, Construct, Error, Logger, ParamValue, ParameterMap};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Settings {
    name: String,
    port: u16,
}

struct Service {
    settings: Settings,
    logger: Logger,
}

impl Construct for Service {
    const CLASS: &'static str = "demo::Service";
    type Error = Error;

    fn construct(mut params: ParameterMap) -> Result<Self, Error> {
        let logger = match params.remove("logger") {
            Some(ParamValue::Logger(logger)) => logger,
            _ => Logger::new(false),
        };
        let settings = params.deserialize().map_err(|e| Error::ConfigLoadFailed {
            class: Self::CLASS.to_string(),
            source: e,
        })?;
        Ok(Self { settings, logger })
    }
}

fn main() -> Result<(), Error> {
    // DEMO__SERVICE__PORT=9000 cargo run --example inject
    let mut params = ParameterMap::new();
    params.insert("name", "demo");
    params.insert("port", 8080);
    params.insert("carp_on_warn", true);

    let service: Service = instantiate(params)?;

    println!(
        "service {} listening on port {}",
        service.settings.name, service.settings.port
    );
    service.logger.warn("demo warning, echoed to stderr");

    Ok(())
}
