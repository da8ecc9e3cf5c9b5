use bookly::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() {
    let subscriber = get_subscriber("bookly".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    bookly::run().await.expect("Failed running server.");
}
