//! Per-session round history and running profit/loss.

use serde::{Deserialize, Serialize};
use std::io;

use super::{Alphabet, Decimal, Outcome, Side, StateSnapshot};

/// One resolved round: a recommendation paired with the observed outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    pub round: u32,
    pub side: Side,
    pub outcome: Outcome,
    /// False for a netted round whose legs cancelled to a zero stake.
    pub placed: bool,
    pub won: bool,
    pub stake: Decimal,
    pub pnl_delta: Decimal,
    pub cumulative_pnl: Decimal,
    pub state: StateSnapshot,
}

/// Cumulative profit/loss and round history of one engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    pub cumulative_pnl: Decimal,
    pub rounds: Vec<RoundRecord>,
    pub busted: bool,
    pub complete: bool,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a round and fold its P/L into the running total.
    pub fn record(
        &mut self,
        side: Side,
        outcome: Outcome,
        stake: Decimal,
        pnl_delta: Decimal,
        state: StateSnapshot,
    ) -> &RoundRecord {
        self.cumulative_pnl = self.cumulative_pnl.saturating_add(pnl_delta);
        let round = self.rounds.len() as u32 + 1;
        let placed = stake.is_positive();
        self.rounds.push(RoundRecord {
            round,
            side,
            outcome,
            placed,
            won: placed && side == outcome,
            stake,
            pnl_delta,
            cumulative_pnl: self.cumulative_pnl,
            state,
        });
        &self.rounds[self.rounds.len() - 1]
    }

    pub fn mark_busted(&mut self) {
        self.busted = true;
    }

    pub fn mark_complete(&mut self) {
        self.complete = true;
    }

    /// Busted and complete sessions accept no further rounds until reset.
    pub fn is_terminal(&self) -> bool {
        self.busted || self.complete
    }

    pub fn wins(&self) -> usize {
        self.rounds.iter().filter(|r| r.won).count()
    }

    /// Placed rounds that lost. Cancelled rounds count as neither.
    pub fn losses(&self) -> usize {
        self.rounds.iter().filter(|r| r.placed && !r.won).count()
    }

    pub fn total_staked(&self) -> Decimal {
        self.rounds
            .iter()
            .fold(Decimal::zero(), |acc, r| acc.saturating_add(r.stake))
    }

    /// Largest peak-to-trough fall of the cumulative P/L (zero start counts as a peak).
    pub fn max_drawdown(&self) -> Decimal {
        let mut peak = Decimal::zero();
        let mut worst = Decimal::zero();
        for r in &self.rounds {
            peak = peak.max(r.cumulative_pnl);
            worst = worst.max(peak - r.cumulative_pnl);
        }
        worst
    }

    /// Write the round history as CSV with a header row.
    pub fn write_csv<W: io::Write>(&self, alphabet: Alphabet, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record([
            "round",
            "side",
            "outcome",
            "won",
            "stake",
            "pnl_delta",
            "cumulative_pnl",
            "state",
        ])?;
        for r in &self.rounds {
            wtr.write_record([
                r.round.to_string(),
                alphabet.label(r.side).to_string(),
                alphabet.label(r.outcome).to_string(),
                r.won.to_string(),
                r.stake.to_canonical_string(),
                r.pnl_delta.to_canonical_string(),
                r.cumulative_pnl.to_canonical_string(),
                r.state.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap() -> StateSnapshot {
        StateSnapshot::Cycle { step: 0 }
    }

    #[test]
    fn test_record_accumulates_pnl() {
        let mut ledger = Ledger::new();
        ledger.record(Side::A, Side::A, Decimal::from(10i64), Decimal::from(10i64), snap());
        let last = ledger
            .record(Side::B, Side::A, Decimal::from(30i64), Decimal::from(-30i64), snap())
            .clone();

        assert_eq!(ledger.cumulative_pnl, Decimal::from(-20i64));
        assert_eq!(last.round, 2);
        assert!(!last.won);
        assert_eq!(last.cumulative_pnl, Decimal::from(-20i64));
        assert_eq!(ledger.wins(), 1);
        assert_eq!(ledger.losses(), 1);
        assert_eq!(ledger.total_staked(), Decimal::from(40i64));
    }

    #[test]
    fn test_cancelled_round_is_neither_win_nor_loss() {
        let mut ledger = Ledger::new();
        let cancelled = ledger
            .record(Side::A, Side::A, Decimal::zero(), Decimal::zero(), snap())
            .clone();
        assert!(!cancelled.placed);
        assert!(!cancelled.won);
        ledger.record(Side::B, Side::A, Decimal::one(), -Decimal::one(), snap());
        assert_eq!(ledger.wins(), 0);
        assert_eq!(ledger.losses(), 1);
        assert_eq!(ledger.rounds.len(), 2);
    }

    #[test]
    fn test_max_drawdown_measures_from_running_peak() {
        let mut ledger = Ledger::new();
        for delta in [10i64, -5, -20, 8, -4] {
            ledger.record(Side::A, Side::A, Decimal::one(), Decimal::from(delta), snap());
        }
        // Path: 10, 5, -15, -7, -11; peak 10, trough -15.
        assert_eq!(ledger.max_drawdown(), Decimal::from(25i64));
    }

    #[test]
    fn test_terminal_flags() {
        let mut ledger = Ledger::new();
        assert!(!ledger.is_terminal());
        ledger.mark_complete();
        assert!(ledger.is_terminal());
        assert!(!ledger.busted);
    }

    #[test]
    fn test_write_csv() {
        let mut ledger = Ledger::new();
        ledger.record(Side::A, Side::A, Decimal::from(100i64), Decimal::from(95i64), snap());

        let mut buf = Vec::new();
        ledger.write_csv(Alphabet::BankerPlayer, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("round,side,outcome,won,stake,pnl_delta,cumulative_pnl,state")
        );
        assert_eq!(lines.next(), Some("1,Banker,Banker,true,100,95,95,step 0"));
    }
}
