//! Prometheus metrics flags.

use clap::Parser;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Prometheus metrics flags.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
pub struct MetricsArgs {
    /// Serve Prometheus metrics.
    #[arg(long = "metrics.enabled", env = "RBRIDGE_METRICS_ENABLED", global = true)]
    pub enabled: bool,
    /// Listen address of the metrics server.
    #[arg(
        long = "metrics.addr",
        default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        env = "RBRIDGE_METRICS_ADDR",
        global = true
    )]
    pub addr: IpAddr,
    /// Listen port of the metrics server.
    #[arg(
        long = "metrics.port",
        default_value_t = MetricsArgs::DEFAULT_PORT,
        env = "RBRIDGE_METRICS_PORT",
        global = true
    )]
    pub port: u16,
}

impl MetricsArgs {
    /// Default listen port.
    pub const DEFAULT_PORT: u16 = 9090;

    /// The address the metrics server binds to.
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.addr, self.port)
    }

    /// Installs the Prometheus recorder and its HTTP listener if metrics are enabled.
    ///
    /// Must be called from within a tokio runtime.
    pub fn init_metrics(&self) -> Result<(), BuildError> {
        if self.enabled {
            PrometheusBuilder::new().with_http_listener(self.socket_addr()).install()?;
        }
        Ok(())
    }
}

impl Default for MetricsArgs {
    fn default() -> Self {
        Self { enabled: false, addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: Self::DEFAULT_PORT }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser, Debug)]
    struct MockCommand {
        #[clap(flatten)]
        metrics: MetricsArgs,
    }

    #[test]
    fn test_metrics_disabled_by_default() {
        let args = MockCommand::parse_from(["test"]);
        assert_eq!(args.metrics, MetricsArgs::default());
        assert!(args.metrics.init_metrics().is_ok());
    }

    #[test]
    fn test_metrics_listen_flags() {
        let args = MockCommand::parse_from([
            "test",
            "--metrics.enabled",
            "--metrics.addr",
            "127.0.0.1",
            "--metrics.port",
            "1234",
        ]);
        assert!(args.metrics.enabled);
        assert_eq!(args.metrics.socket_addr(), "127.0.0.1:1234".parse::<SocketAddr>().unwrap());
    }
}
