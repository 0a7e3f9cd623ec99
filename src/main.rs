#[tokio::main]
async fn main() {
    volunteer_backend::run().await;
}
