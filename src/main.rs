#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    hostel_admission_server::run().await
}
