use axum::Router;
use if_addrs::get_if_addrs;
use std::net::IpAddr;
use tokio::net::{TcpListener, ToSocketAddrs};

/// Bind `addr` and serve `router` until SIGINT/SIGTERM.
pub async fn serve<S: ToSocketAddrs>(addr: S, router: Router) -> std::io::Result<()> {
    let tcp_listener = TcpListener::bind(addr).await?;
    print_listener_urls(&tcp_listener);

    axum::serve(tcp_listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

fn print_listener_urls(listener: &TcpListener) {
    let Ok(addr) = listener.local_addr() else {
        tracing::warn!("could not determine the address the server is listening on");
        return;
    };

    let port = addr.port();
    tracing::info!("Listening on port {port}");
    if addr.ip().is_unspecified() {
        for ip in interface_ips(addr.is_ipv6()) {
            print_addr(ip, port);
        }
    } else {
        print_addr(addr.ip(), port);
    }
}

fn interface_ips(ipv6: bool) -> Vec<IpAddr> {
    get_if_addrs()
        .into_iter()
        .flatten()
        .map(|i| i.ip())
        .filter(|ip| ip.is_ipv6() == ipv6)
        .collect()
}

fn print_addr(addr: IpAddr, port: u16) {
    match addr {
        _ if addr.is_loopback() => tracing::info!("➜  Local:   http://localhost:{port}"),
        IpAddr::V4(_) => tracing::info!("➜  Network: http://{addr}:{port}"),
        // Enclose IPv6 addresses in square brackets
        IpAddr::V6(_) => tracing::info!("➜  Network: http://[{addr}]:{port}"),
    }
}

pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
