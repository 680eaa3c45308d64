//! Command implementations, written against a [`ProfileManager`] and an
//! output sink so they can run against in-memory storage in tests.

use std::io::Write;

use eyre::{eyre, Result};
use keychain_core::{Account, AccountForm, ProfileManager};

const PASSWORD_MASK: &str = "********";

/// Creates the device account and prints it.
pub fn create(
    manager: &ProfileManager,
    out: &mut impl Write,
    name: Option<String>,
    email: String,
    password: String,
    confirm: Option<String>,
) -> Result<()> {
    let password_confirmation = confirm.unwrap_or_else(|| password.clone());
    let account = manager.create_account(AccountForm {
        name,
        email,
        password,
        password_confirmation,
    })?;
    tracing::info!(id = %account.id, "account created");
    writeln!(out, "Successfully created account.")?;
    print_account(out, &account, false)
}

/// Prints the current account.
pub fn show(manager: &ProfileManager, out: &mut impl Write, reveal: bool) -> Result<()> {
    match manager.current_account() {
        Some(account) => print_account(out, &account, reveal),
        None => {
            if manager.current_account_id().is_some() {
                tracing::warn!("current account id is set but the entry cannot be read");
            }
            writeln!(out, "No account. Create one with `keychain-cli create`.")?;
            Ok(())
        }
    }
}

/// Edits the current account. Omitted fields keep their stored value.
pub fn edit(
    manager: &ProfileManager,
    out: &mut impl Write,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    confirm: Option<String>,
) -> Result<()> {
    let current = manager
        .current_account()
        .ok_or_else(|| eyre!("no account available for editing"))?;
    let password = password.unwrap_or(current.password);
    let password_confirmation = confirm.unwrap_or_else(|| password.clone());
    let account = manager.edit_account(AccountForm {
        name,
        email: email.unwrap_or(current.email),
        password,
        password_confirmation,
    })?;
    tracing::info!(id = %account.id, "account updated");
    writeln!(out, "Successfully updated account.")?;
    print_account(out, &account, false)
}

/// Deletes the current account.
pub fn delete(manager: &ProfileManager, out: &mut impl Write) -> Result<()> {
    manager.delete_account()?;
    writeln!(out, "Successfully deleted account.")?;
    Ok(())
}

fn print_account(out: &mut impl Write, account: &Account, reveal: bool) -> Result<()> {
    writeln!(out, "id:       {}", account.id)?;
    writeln!(out, "name:     {}", account.name.as_deref().unwrap_or("-"))?;
    writeln!(out, "email:    {}", account.email)?;
    let password = if reveal {
        account.password.as_str()
    } else {
        PASSWORD_MASK
    };
    writeln!(out, "password: {password}")?;
    Ok(())
}
