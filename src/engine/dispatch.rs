//! Sign, confirm and submit
//!
//! Order is fixed: sequence → draft → signature → transport encoding →
//! confirmation → submission. Any failure before the last step leaves the
//! network untouched.

use super::{Assembled, Engine};
use crate::confirm::ConfirmationGate;
use crate::errors::RequestError;
use crate::structured_logging::RequestContext;
use crate::tx_builder::sign;
use crate::types::SubmissionResult;

impl<'a> Engine<'a> {
    pub(super) async fn dispatch(
        &self,
        assembled: Assembled<'a>,
        ctx: &RequestContext,
    ) -> Result<SubmissionResult, RequestError> {
        let Assembled {
            wallet,
            builder,
            summary,
        } = assembled;
        let network = self.config.network;

        let sequence = self.ledger.next_sequence(&wallet.public_key()).await?;
        let draft = builder.build(sequence, self.config.base_fee, network)?;
        let op_names: Vec<&str> = draft.operations.iter().map(|op| op.name()).collect();
        ctx.logger.log_draft_built(&op_names, draft.sequence, draft.fee);

        let signed = sign(draft, wallet.keypair())?;
        let envelope = signed.to_base64()?;
        let local_hash = signed.hash_hex();

        ConfirmationGate::new(self.config.skip_confirmation).check(
            &summary,
            network,
            self.selector,
        )?;

        ctx.logger
            .log_submit_attempt(&local_hash, signed.draft().operations.len());
        let resp = self.ledger.submit_transaction(&envelope).await?;
        if resp.hash != local_hash {
            ctx.logger.warn(&format!(
                "ledger reported hash {} for local hash {}",
                resp.hash, local_hash
            ));
        }
        ctx.logger
            .log_submit_success(&resp.hash, resp.ledger, ctx.elapsed_ms());
        Ok(SubmissionResult {
            hash: resp.hash,
            ledger: resp.ledger,
        })
    }
}
