use std::{env, str::FromStr};

use eyre::{eyre, WrapErr};
use relay_fees::{
    rust_decimal::Decimal, validate_expiration_time, ConstantRates, FeeCalculator, FeeConfig,
    RelayRequest, StaticTokens,
};

const USAGE: &str =
    "<config.json> <request.json> <estimated gas> <token decimals> <native price> <usd price>";

/// usage: quote <config.json> <request.json> <estimated gas> <token decimals>
/// <native price> <usd price>
#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = env::args().collect::<Vec<_>>();
    if args.len() != 7 {
        return Err(eyre!("usage: {} {}", args[0], USAGE));
    }

    let config = FeeConfig::from_json_file(&args[1]).wrap_err("reading fee config")?;
    let request: RelayRequest =
        serde_json::from_str(&std::fs::read_to_string(&args[2])?).wrap_err("reading request")?;
    let estimated_gas = args[3].parse::<u64>()?.into();

    let tokens = StaticTokens::default().with_fallback(args[4].parse()?);
    let rates = ConstantRates::new(Decimal::from_str(&args[5])?, Decimal::from_str(&args[6])?);
    let calculator = FeeCalculator::new(tokens, rates);

    if let Err(e) = validate_expiration_time(request.request.valid_until_time, 0).await {
        println!("Warning: {}", e);
    }

    let fee = calculator
        .calculate_fee(&request, estimated_gas, &config)
        .await?;
    let required = calculator
        .required_gas(&request, estimated_gas, &config)
        .await?;

    println!("Call kind: {:?}", request.call_kind());
    println!("Fee (gas): {}", fee);
    println!("Required gas: {}", required);
    println!(
        "Required tokens: {}",
        calculator.quote_in_token(&request, required).await?
    );

    Ok(())
}
