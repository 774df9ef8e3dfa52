//! matchbook demo binary.
//!
//! Registers one security, replays a small book, then a buy that moves the
//! market price into a waiting stop-limit order.

use matchbook::ledger::{Broker, Shareholder};
use matchbook::types::{EnterOrderRq, Side};
use matchbook::{EngineConfig, Exchange};
use tracing::{error, info};

const ISIN: &str = "DEMO";

fn main() {
    tracing_subscriber::fmt::init();

    let exchange = Exchange::new(EngineConfig::default());
    exchange.ledger().add_broker(Broker::new(1, 100_000_000));
    let mut holder = Shareholder::new(1);
    holder.increase_position(ISIN, 100_000);
    exchange.ledger().add_shareholder(holder);
    if let Err(err) = exchange.add_security(ISIN, Some(15_000)) {
        error!(%err, "registration failed");
        return;
    }

    let book = [
        (Side::Sell, 350, 15_800),
        (Side::Sell, 285, 15_810),
        (Side::Sell, 800, 15_810),
        (Side::Sell, 340, 15_820),
        (Side::Sell, 65, 15_820),
        (Side::Buy, 304, 15_700),
        (Side::Buy, 43, 15_500),
        (Side::Buy, 445, 15_450),
        (Side::Buy, 526, 15_450),
        (Side::Buy, 1_000, 15_400),
    ];

    let mut requests: Vec<EnterOrderRq> = book
        .iter()
        .zip(1u64..)
        .map(|(&(side, quantity, price), id)| {
            EnterOrderRq::new_order(id, ISIN, id, side, quantity, price, 1, 1)
        })
        .collect();
    requests.push(EnterOrderRq::new_order(11, ISIN, 11, Side::Buy, 20, 15_900, 1, 1).with_stop_price(15_805));
    requests.push(EnterOrderRq::new_order(12, ISIN, 12, Side::Buy, 360, 15_810, 1, 1));

    for rq in &requests {
        for event in exchange.handle_enter_order(rq) {
            info!(?event, "event");
        }
    }

    let Some(security) = exchange.security(ISIN) else {
        error!(isin = ISIN, "security vanished");
        return;
    };
    let security = security.lock();
    match security.state_root() {
        Ok(root) => info!(
            market_price = security.market_price(),
            trades = security.trade_count(),
            state_root = %root,
            "done"
        ),
        Err(err) => error!(%err, "state root unavailable"),
    }
}
