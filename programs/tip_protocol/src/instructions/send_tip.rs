use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Allocate, Assign, CreateAccount, Transfer};

use crate::constants::*;
use crate::events::TipSent;
use crate::state::TipRecord;
use crate::utils::*;

pub fn handler(ctx: Context<SendTip>, amount: u64, message: String, seed: u64) -> Result<()> {
    let message = validate_tip_args(amount, &message)?;

    let sender_key = ctx.accounts.sender.key();
    let record_info = ctx.accounts.tip_record.to_account_info();

    // The record must live at its derived address and not exist yet
    let bump = verify_tip_address(ctx.program_id, &sender_key, seed, record_info.key)?;
    ensure_vacant(record_info.owner, record_info.data_len())?;

    let rent = Rent::get()?;
    let space = TipRecord::space(message.len());
    let deposit = storage_deposit(&rent, space, record_info.lamports());
    let sender = &ctx.accounts.sender;
    ensure_funds(&rent, sender.lamports(), sender.data_len(), amount, deposit)?;
    let recipient = &ctx.accounts.recipient;
    ensure_recipient_settled(&rent, recipient.lamports(), recipient.data_len(), amount)?;

    let seed_bytes = seed.to_le_bytes();
    let bump_bytes = [bump];
    let signer_seeds: &[&[u8]] = &[TIP_SEED, sender_key.as_ref(), &seed_bytes, &bump_bytes];
    allocate_record(&ctx.accounts, ctx.program_id, space, deposit, &[signer_seeds])?;

    let timestamp = Clock::get()?.unix_timestamp;
    let record = TipRecord {
        sender: sender_key,
        recipient: ctx.accounts.recipient.key(),
        amount,
        message,
        timestamp,
        bump,
    };
    {
        let mut data = record_info.try_borrow_mut_data()?;
        let mut writer: &mut [u8] = &mut data;
        record.try_serialize(&mut writer)?;
    }

    system_program::transfer(
        CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            Transfer {
                from: ctx.accounts.sender.to_account_info(),
                to: ctx.accounts.recipient.to_account_info(),
            },
        ),
        amount,
    )?;

    emit!(TipSent {
        tip_record: record_info.key(),
        sender: sender_key,
        recipient: record.recipient,
        amount,
        seed,
        timestamp,
    });

    msg!("Tip sent: amount={}, seed={}, record={}", amount, seed, record_info.key());
    Ok(())
}

/// Create the record account at its PDA, funded by the sender.
/// A slot that already holds lamports cannot be created, so it is topped up,
/// allocated and assigned instead.
fn allocate_record<'info>(
    accounts: &SendTip<'info>,
    program_id: &Pubkey,
    space: usize,
    deposit: u64,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    let system_program = accounts.system_program.to_account_info();
    let sender = accounts.sender.to_account_info();
    let record = accounts.tip_record.to_account_info();

    if record.lamports() == 0 {
        return system_program::create_account(
            CpiContext::new_with_signer(
                system_program,
                CreateAccount { from: sender, to: record },
                signer_seeds,
            ),
            deposit,
            space as u64,
            program_id,
        );
    }

    msg!("Tip record pre-funded with {} lamports", record.lamports());
    if deposit > 0 {
        system_program::transfer(
            CpiContext::new(
                system_program.clone(),
                Transfer { from: sender, to: record.clone() },
            ),
            deposit,
        )?;
    }
    system_program::allocate(
        CpiContext::new_with_signer(
            system_program.clone(),
            Allocate { account_to_allocate: record.clone() },
            signer_seeds,
        ),
        space as u64,
    )?;
    system_program::assign(
        CpiContext::new_with_signer(
            system_program,
            Assign { account_to_assign: record },
            signer_seeds,
        ),
        program_id,
    )
}

#[derive(Accounts)]
pub struct SendTip<'info> {
    /// Pays the tip, the storage deposit and the fee
    #[account(mut)]
    pub sender: Signer<'info>,

    #[account(mut)]
    pub recipient: SystemAccount<'info>,

    /// CHECK: address, owner and emptiness are verified in the handler
    #[account(mut)]
    pub tip_record: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}
