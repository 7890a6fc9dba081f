// Moneydrain Escrow Betting Ledger - Main Entry Point
// Two-party matched bets with time-parity resolution and a 1% house fee

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use moneydrain_ledger::app_state::{AppState, SharedState};
use moneydrain_ledger::routes::router;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    println!("\n═══════════════════════════════════════════════");
    println!("     🎲 Moneydrain Escrow Betting Ledger");
    println!("═══════════════════════════════════════════════\n");

    // The operator identity is fixed at deployment and collects the house fee
    let owner = std::env::var("OWNER_ADDRESS").unwrap_or_else(|_| "OWNER".to_string());
    println!("👑 Operator: {}", owner);

    let mut app_state = AppState::new(&owner);
    match app_state.load_from_disk() {
        Ok(()) => println!("✅ Loaded persisted state from disk"),
        Err(_) => println!("ℹ️  No persisted state found, starting fresh"),
    }

    let state: SharedState = Arc::new(Mutex::new(app_state));

    // Clone state for shutdown handler before moving into router
    let shutdown_state = state.clone();

    let app = router(state);

    let port: u16 = std::env::var("MONEYDRAIN_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(1234);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("\n╔════════════════════════════════════════════╗");
    println!("║   🚀 SERVER RUNNING                        ║");
    println!("║   📡 http://0.0.0.0:{:<5}                  ║", port);
    println!("╚════════════════════════════════════════════╝\n");

    println!("📋 Available Endpoints:");
    println!("   POST /accounts/connect   - Connect account (creates & funds if new)");
    println!("   POST /bets               - Open a bet (stake escrowed)");
    println!("   POST /bets/:id/take      - Match a bet (resolves the winner)");
    println!("   POST /bets/:id/withdraw  - Collect the pot (winner only)");
    println!("   GET  /bets/:id           - Bet details");
    println!("   GET  /counter            - Number of bets ever created");
    println!("   GET  /owner              - Operator identity");
    println!("   GET  /balance/:account   - Account balance");
    println!("   GET  /transfers/:account - Account transfer history");
    println!("   GET  /withdrawals        - Withdrawal event feed");
    println!("   GET  /ledger             - Activity feed\n");

    // Setup graceful shutdown
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    // Spawn shutdown handler
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");

        println!("\n\n🛑 Shutdown signal received...");
        println!("💾 Saving state to disk...");

        if let Ok(app_state) = shutdown_state.lock() {
            if let Err(e) = app_state.save_to_disk() {
                eprintln!("❌ Failed to save state: {}", e);
            } else {
                println!("✅ State saved successfully");
            }
        }

        println!("👋 Goodbye!\n");
        std::process::exit(0);
    });

    axum::serve(listener, app).await.unwrap();
}
