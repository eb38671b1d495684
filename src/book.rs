//! Price-time priority limit order book and matching.
//!
//! [`OrderBook::match_order`] walks the opposite side of the book one
//! resting order at a time, trading at the resting order's price, and
//! rests whatever quantity remains once the walk stops. [`OrderBook::cancel_order`]
//! removes a resting order by id.
//!
//! Price levels are kept in two `BTreeMap`s (bids descending by key order
//! reversed at lookup time, asks ascending) so the best price on either side
//! is always the map's first key. Within a level, orders sit in a `VecDeque`
//! in arrival order — the front is the oldest, and therefore next in line
//! (spec §4.4, price-time priority).

use std::collections::{BTreeMap, HashMap, VecDeque};

use ordered_float::NotNan;

use crate::execution::ExecutionReport;
use crate::types::{ExecType, Order, Side};

type PriceKey = NotNan<f64>;

#[derive(Clone, Debug)]
struct RestingOrder {
    order_id: String,
    #[allow(dead_code)]
    user_id: String,
    price: f64,
    remaining_quantity: i32,
}

/// A single-instrument limit order book.
pub struct OrderBook {
    bids: BTreeMap<PriceKey, VecDeque<RestingOrder>>,
    asks: BTreeMap<PriceKey, VecDeque<RestingOrder>>,
    index: HashMap<String, (Side, PriceKey)>,
    last_traded_price: f64,
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: HashMap::new(),
            last_traded_price: 0.0,
        }
    }

    pub fn last_traded_price(&self) -> f64 {
        self.last_traded_price
    }

    pub fn contains(&self, order_id: &str) -> bool {
        self.index.contains_key(order_id)
    }

    fn price_key(price: f64) -> PriceKey {
        NotNan::new(price).expect("price is validated non-NaN at decode time")
    }

    fn levels_mut(&mut self, side: Side) -> &mut BTreeMap<PriceKey, VecDeque<RestingOrder>> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Runs `order` against the opposite side of the book, then rests any
    /// remainder on `order`'s own side.
    ///
    /// Emits one [`ExecutionReport`] per resting order it trades against
    /// (`PARTIAL_FILL` if that order survives with quantity left, `FILL` if
    /// it is fully consumed), followed by exactly one terminal report for
    /// the incoming order (`NEW` if it rests untouched, `PARTIAL_FILL` if it
    /// traded but still has quantity left to rest, `FILL` if it is fully
    /// consumed, with no remainder left to rest).
    ///
    /// That last guarantee is a deliberate fix: walking a resting order that
    /// only partially absorbs the incoming order's quantity stops the walk
    /// (the incoming order is exhausted for this price level) and the
    /// incoming order's own final state is reported once, not once per
    /// remaining call site.
    pub fn match_order(&mut self, order: Order) -> Vec<ExecutionReport> {
        let mut reports = Vec::new();
        let mut remaining = order.remaining_quantity;
        let mut traded_any = false;

        let opposite = match order.side {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        };

        'walk: while remaining > 0 {
            let opposite_levels_ref = match opposite {
                Side::Buy => &self.bids,
                Side::Sell => &self.asks,
            };
            let best_key = match order.side {
                // incoming buy takes the lowest ask
                Side::Buy => opposite_levels_ref.keys().next().copied(),
                // incoming sell takes the highest bid
                Side::Sell => opposite_levels_ref.keys().next_back().copied(),
            };
            let Some(best_key) = best_key else {
                break 'walk;
            };
            let crosses = match order.side {
                Side::Buy => best_key.into_inner() <= order.price,
                Side::Sell => best_key.into_inner() >= order.price,
            };
            if !crosses {
                break 'walk;
            }

            // Snapshot the front resting order's relevant fields, then drop
            // the borrow before mutating the book below.
            let (front_order_id, front_price, front_remaining) = {
                let level = opposite_levels_ref.get(&best_key).expect("key came from this map");
                let front = level.front().expect("levels are never left empty");
                (front.order_id.clone(), front.price, front.remaining_quantity)
            };

            let trade_qty = remaining.min(front_remaining);
            let new_front_remaining = front_remaining - trade_qty;
            remaining -= trade_qty;
            traded_any = true;
            self.last_traded_price = front_price;

            let opposite_levels = match opposite {
                Side::Buy => &mut self.bids,
                Side::Sell => &mut self.asks,
            };
            let level = opposite_levels.get_mut(&best_key).expect("key came from this map");

            if new_front_remaining == 0 {
                level.pop_front();
                if level.is_empty() {
                    opposite_levels.remove(&best_key);
                }
                self.index.remove(&front_order_id);
                reports.push(ExecutionReport {
                    order_id: front_order_id,
                    price: front_price,
                    last_shares: trade_qty,
                    leaves_qty: 0,
                    exec_type: ExecType::Fill,
                });
            } else {
                level.front_mut().expect("front still there").remaining_quantity = new_front_remaining;
                reports.push(ExecutionReport {
                    order_id: front_order_id,
                    price: front_price,
                    last_shares: trade_qty,
                    leaves_qty: new_front_remaining,
                    exec_type: ExecType::PartialFill,
                });
                // The resting order survived, so the incoming order's
                // quantity is exhausted at this level; remaining is 0 here.
                break 'walk;
            }
        }

        let exec_type = match (traded_any, remaining) {
            (false, _) => ExecType::New,
            (true, 0) => ExecType::Fill,
            (true, _) => ExecType::PartialFill,
        };
        reports.push(ExecutionReport {
            order_id: order.order_id.clone(),
            price: if traded_any { self.last_traded_price } else { 0.0 },
            last_shares: order.remaining_quantity - remaining,
            leaves_qty: remaining,
            exec_type,
        });

        if remaining > 0 {
            let key = Self::price_key(order.price);
            self.index.insert(order.order_id.clone(), (order.side, key));
            self.levels_mut(order.side).entry(key).or_default().push_back(RestingOrder {
                order_id: order.order_id,
                user_id: order.user_id,
                price: order.price,
                remaining_quantity: remaining,
            });
        }

        reports
    }

    /// Removes a resting order by id. Returns `None` if no such order is
    /// resting (spec §4.4: the caller should not emit a report in that
    /// case).
    ///
    /// `leaves_qty` on the returned report is always `0` (spec §3/§4.4.3):
    /// it reflects the order's remaining quantity *after* this event, and a
    /// canceled order has nothing left to leave.
    pub fn cancel_order(&mut self, order_id: &str) -> Option<ExecutionReport> {
        let (side, key) = self.index.remove(order_id)?;
        let levels = self.levels_mut(side);
        let level = levels.get_mut(&key)?;
        let position = level.iter().position(|o| o.order_id == order_id)?;
        let removed = level.remove(position)?;
        if level.is_empty() {
            levels.remove(&key);
        }
        Some(ExecutionReport {
            order_id: removed.order_id,
            price: 0.0,
            last_shares: 0,
            leaves_qty: 0,
            exec_type: ExecType::Canceled,
        })
    }

    pub fn best_bid(&self) -> Option<f64> {
        self.bids.keys().next_back().map(|k| k.into_inner())
    }

    pub fn best_ask(&self) -> Option<f64> {
        self.asks.keys().next().map(|k| k.into_inner())
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}
