// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Redemption eligibility and the confirm dialog state machine.

use crate::config::ConfigError;
use crate::error::AppError;
use crate::models::{Points, Prize, SessionSnapshot};
use std::future::Future;
use std::str::FromStr;

/// True iff the balance covers the cost and the prize is in stock.
///
/// An unparsable balance (NaN) never qualifies.
pub fn can_redeem(user_points: Points, prize: &Prize) -> bool {
    user_points.value() >= prize.points.value() && prize.stock > 0
}

/// Why the dialog refuses to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemBlock {
    InsufficientPoints,
    OutOfStock,
    MissingAddress,
}

impl RedeemBlock {
    pub fn message(self) -> &'static str {
        match self {
            RedeemBlock::InsufficientPoints => "积分不足",
            RedeemBlock::OutOfStock => "库存不足",
            RedeemBlock::MissingAddress => {
                "兑换实物奖品需要收货地址，请先在\"我的\"页面设置收货地址"
            }
        }
    }
}

impl From<RedeemBlock> for AppError {
    fn from(block: RedeemBlock) -> Self {
        AppError::Validation(block.message().to_string())
    }
}

/// Checks run before the redemption dialog opens.
pub struct RedeemGate;

impl RedeemGate {
    pub fn check(user: &SessionSnapshot, prize: &Prize) -> Result<(), RedeemBlock> {
        if user.points.value().is_nan() || user.points.value() < prize.points.value() {
            return Err(RedeemBlock::InsufficientPoints);
        }
        if prize.stock == 0 {
            return Err(RedeemBlock::OutOfStock);
        }
        if user.primary_address().is_none() {
            return Err(RedeemBlock::MissingAddress);
        }
        Ok(())
    }
}

/// What the dialog shows after the redeem call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedemptionFailureBehavior {
    /// Back to the confirm step; the caller's notification is the only signal
    #[default]
    ResetSilently,
    /// Stay open with the failure message
    ShowInline,
}

impl FromStr for RedemptionFailureBehavior {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reset" => Ok(RedemptionFailureBehavior::ResetSilently),
            "inline" => Ok(RedemptionFailureBehavior::ShowInline),
            _ => Err(ConfigError::Invalid("REDEMPTION_FAILURE", s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalPhase {
    Confirming,
    Redeeming,
    Redeemed,
    Failed { message: String },
}

/// Confirm dialog for one prize.
#[derive(Debug, Clone)]
pub struct RedemptionModal {
    prize: Prize,
    user_points: Points,
    on_failure: RedemptionFailureBehavior,
    phase: ModalPhase,
    open: bool,
}

impl RedemptionModal {
    pub fn open(prize: Prize, user_points: Points, on_failure: RedemptionFailureBehavior) -> Self {
        Self {
            prize,
            user_points,
            on_failure,
            phase: ModalPhase::Confirming,
            open: true,
        }
    }

    pub fn prize(&self) -> &Prize {
        &self.prize
    }

    pub fn phase(&self) -> &ModalPhase {
        &self.phase
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether the confirm button is enabled.
    pub fn can_confirm(&self) -> bool {
        self.open
            && matches!(self.phase, ModalPhase::Confirming | ModalPhase::Failed { .. })
            && can_redeem(self.user_points, &self.prize)
    }

    /// Enter `Redeeming`. Fails if the confirm button is disabled.
    pub fn begin(&mut self) -> Result<(), AppError> {
        if !self.can_confirm() {
            return Err(AppError::Validation(
                if can_redeem(self.user_points, &self.prize) {
                    "兑换进行中"
                } else {
                    "积分不足或库存不足"
                }
                .to_string(),
            ));
        }
        self.phase = ModalPhase::Redeeming;
        Ok(())
    }

    /// Leave `Redeeming` with the outcome of the redeem call.
    pub fn finish(&mut self, outcome: &Result<(), AppError>) {
        if self.phase != ModalPhase::Redeeming {
            return;
        }
        self.phase = match outcome {
            Ok(()) => ModalPhase::Redeemed,
            Err(e) => match self.on_failure {
                RedemptionFailureBehavior::ResetSilently => ModalPhase::Confirming,
                RedemptionFailureBehavior::ShowInline => ModalPhase::Failed {
                    message: e.notification(),
                },
            },
        };
    }

    /// Run the caller's redeem callback; `Redeemed` is entered only after it
    /// completes successfully.
    pub async fn confirm<F, Fut>(&mut self, submit: F) -> Result<(), AppError>
    where
        F: FnOnce(Prize) -> Fut,
        Fut: Future<Output = Result<(), AppError>>,
    {
        self.begin()?;
        let outcome = submit(self.prize.clone()).await;
        self.finish(&outcome);
        outcome
    }

    /// Close the dialog. Ignored while a redemption is in flight.
    pub fn close(&mut self) -> bool {
        if self.phase == ModalPhase::Redeeming {
            return false;
        }
        self.open = false;
        self.phase = ModalPhase::Confirming;
        true
    }
}
