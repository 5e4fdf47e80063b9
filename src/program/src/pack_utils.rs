use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, program_error::ProgramError,
    program_pack::Pack,
};

use crate::state::TimelockAccount;

/// Scoped access to the lock record stored in an account
pub trait WithData<T> {
    fn with_immut_data<R>(&self, f: impl FnOnce(T) -> Result<R, ProgramError>)
        -> Result<R, ProgramError>;
    fn with_mut_data(&self, f: impl FnOnce(T) -> Result<T, ProgramError>) -> ProgramResult;
}

impl WithData<TimelockAccount> for AccountInfo<'_> {
    fn with_immut_data<R>(
        &self,
        f: impl FnOnce(TimelockAccount) -> Result<R, ProgramError>,
    ) -> Result<R, ProgramError> {
        let timelock_account_data = TimelockAccount::unpack(&self.try_borrow_data()?)?;
        f(timelock_account_data)
    }

    fn with_mut_data(
        &self,
        f: impl FnOnce(TimelockAccount) -> Result<TimelockAccount, ProgramError>,
    ) -> ProgramResult {
        let timelock_account_data = TimelockAccount::unpack(&self.try_borrow_data()?)?;
        let timelock_account_data = f(timelock_account_data)?;
        timelock_account_data.pack_into_slice(&mut self.try_borrow_mut_data()?);
        Ok(())
    }
}
