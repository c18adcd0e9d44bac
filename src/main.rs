use anyhow::Result;
use envplate::cli::{App, Args};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();
    let mut app = App::from_args(&args)?;

    app.run(args).await?;

    Ok(())
}
