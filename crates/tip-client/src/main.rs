//! Tip protocol helper CLI.
//! Prints one JSON object to stdout per command.

use std::str::FromStr;

use anchor_lang::prelude::{Pubkey, Rent};
use anchor_lang::AccountDeserialize;
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tip_protocol::state::TipRecord;
use tip_protocol::utils::{storage_deposit, validate_tip_args};
use tip_client::{compute_tip_address, FailureKind};

#[derive(Parser, Debug)]
#[command(name = "tip-cli")]
#[command(about = "Address, deposit and record helpers for the tip protocol", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Derives the tip record address for a sender and seed.
    Address {
        #[arg(long)]
        sender: String,
        #[arg(long)]
        seed: u64,
    },
    /// Prints record space and the rent-exempt deposit for a message.
    Deposit {
        #[arg(long, default_value = "")]
        message: String,
    },
    /// Runs the program's argument checks locally.
    Check {
        #[arg(long)]
        amount: u64,
        #[arg(long, default_value = "")]
        message: String,
    },
    /// Decodes base64 tip record account data.
    Decode {
        #[arg(long)]
        data: String,
    },
}

#[derive(Serialize)]
struct OutAddress {
    program: String,
    sender: String,
    seed: u64,
    address: String,
    bump: u8,
}

#[derive(Serialize)]
struct OutDeposit {
    message_len: usize,
    space: usize,
    deposit_lamports: u64,
}

#[derive(Serialize)]
struct OutCheck {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stored_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct OutRecord {
    sender: String,
    recipient: String,
    amount: u64,
    message: String,
    timestamp: i64,
    bump: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Address { sender, seed } => {
            let sender = Pubkey::from_str(&sender).map_err(|e| anyhow!("invalid sender: {}", e))?;
            let (address, bump) = compute_tip_address(&sender, seed)?;
            let out = OutAddress {
                program: tip_protocol::ID.to_string(),
                sender: sender.to_string(),
                seed,
                address: address.to_string(),
                bump,
            };
            println!("{}", serde_json::to_string(&out)?);
        }
        Commands::Deposit { message } => {
            let space = TipRecord::space(message.len());
            let out = OutDeposit {
                message_len: message.len(),
                space,
                deposit_lamports: storage_deposit(&Rent::default(), space, 0),
            };
            println!("{}", serde_json::to_string(&out)?);
        }
        Commands::Check { amount, message } => {
            let out = match validate_tip_args(amount, &message) {
                Ok(stored) => OutCheck {
                    ok: true,
                    stored_message: Some(stored),
                    error: None,
                },
                Err(err) => OutCheck {
                    ok: false,
                    stored_message: None,
                    error: Some(FailureKind::from_program_error(err).to_string()),
                },
            };
            println!("{}", serde_json::to_string(&out)?);
        }
        Commands::Decode { data } => {
            let bytes = STANDARD.decode(data).context("data is not base64")?;
            let record = TipRecord::try_deserialize(&mut bytes.as_slice())
                .map_err(|e| anyhow!("not a tip record: {}", e))?;
            let out = OutRecord {
                sender: record.sender.to_string(),
                recipient: record.recipient.to_string(),
                amount: record.amount,
                message: record.message,
                timestamp: record.timestamp,
                bump: record.bump,
            };
            println!("{}", serde_json::to_string(&out)?);
        }
    }

    Ok(())
}
