//! Purchase sessions: a private copy of the catalog with stock counts, the
//! cart that stock moves into, and checkout against an account balance.

use std::fmt::{Display, Formatter};

use crate::accounts::Account;
use crate::catalog::Catalog;
use crate::money::Money;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockedItem {
    pub name: String,
    pub price: Money,
    pub available: u32,
}

/// The inventory as seen by one purchase session.
#[derive(Debug, Clone)]
pub struct SessionInventory {
    items: Vec<StockedItem>,
}

impl SessionInventory {
    pub fn new(catalog: &Catalog, stock: u32) -> SessionInventory {
        SessionInventory {
            items: catalog
                .iter()
                .map(|item| StockedItem {
                    name: item.name.clone(),
                    price: item.price,
                    available: stock,
                })
                .collect(),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|i| i.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &StockedItem> {
        self.items.iter()
    }

    pub fn get(&self, name: &str) -> Option<&StockedItem> {
        self.items.iter().find(|i| i.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut StockedItem> {
        self.items.iter_mut().find(|i| i.name == name)
    }

    pub fn price(&self, name: &str) -> Option<Money> {
        self.get(name).map(|i| i.price)
    }

    pub fn available(&self, name: &str) -> u32 {
        self.get(name).map(|i| i.available).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    ZeroQuantity,
    UnknownItem(String),
    OutOfStock { name: String, available: u32 },
    NotInCart(String),
    TooManyToRemove { name: String, in_cart: u32 },
    TotalTooLarge,
}

impl Display for CartError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CartError::ZeroQuantity => write!(f, "Quantity must be at least 1."),
            CartError::UnknownItem(name) => write!(f, "{} is not for sale.", name),
            CartError::OutOfStock { name, available } => {
                write!(f, "Only {} x {} left in stock.", available, name)
            }
            CartError::NotInCart(name) => write!(f, "{} is not in your cart.", name),
            CartError::TooManyToRemove { name, in_cart } => {
                write!(f, "You only have {} x {} in your cart.", in_cart, name)
            }
            CartError::TotalTooLarge => write!(f, "That would make the cart total too large."),
        }
    }
}

impl std::error::Error for CartError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub name: String,
    pub quantity: u32,
    pub price: Money,
    pub total: Money,
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<(String, u32)>,
}

impl Cart {
    pub fn new() -> Cart {
        Cart::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn quantity(&self, name: &str) -> u32 {
        self.lines
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, q)| *q)
            .unwrap_or(0)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|(n, _)| n.as_str())
    }

    /// Moves `quantity` of `name` from the inventory into the cart.
    pub fn add(
        &mut self,
        inventory: &mut SessionInventory,
        name: &str,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }
        let price = inventory
            .price(name)
            .ok_or_else(|| CartError::UnknownItem(name.to_owned()))?;
        if self.total_with(inventory, name, price, quantity).is_none() {
            return Err(CartError::TotalTooLarge);
        }
        let item = inventory
            .get_mut(name)
            .ok_or_else(|| CartError::UnknownItem(name.to_owned()))?;
        if item.available < quantity {
            return Err(CartError::OutOfStock {
                name: name.to_owned(),
                available: item.available,
            });
        }
        item.available -= quantity;

        match self.lines.iter_mut().find(|(n, _)| n == name) {
            Some((_, q)) => *q += quantity,
            None => self.lines.push((name.to_owned(), quantity)),
        }
        log::info!("Added {} x {} to cart", quantity, name);
        Ok(())
    }

    /// Cart total after adding `quantity` more of `name`, if it fits in `Money`.
    fn total_with(
        &self,
        inventory: &SessionInventory,
        name: &str,
        price: Money,
        quantity: u32,
    ) -> Option<Money> {
        let added = price.checked_mul(self.quantity(name).checked_add(quantity)?)?;
        self.lines
            .iter()
            .filter(|(n, _)| n != name)
            .try_fold(added, |total, (n, q)| {
                total.checked_add(inventory.price(n)?.checked_mul(*q)?)
            })
    }

    /// Puts `quantity` of `name` back into the inventory.
    pub fn remove(
        &mut self,
        inventory: &mut SessionInventory,
        name: &str,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }
        let idx = self
            .lines
            .iter()
            .position(|(n, _)| n == name)
            .ok_or_else(|| CartError::NotInCart(name.to_owned()))?;
        let in_cart = self.lines[idx].1;
        if quantity > in_cart {
            return Err(CartError::TooManyToRemove {
                name: name.to_owned(),
                in_cart,
            });
        }

        if quantity == in_cart {
            self.lines.remove(idx);
        } else {
            self.lines[idx].1 -= quantity;
        }
        if let Some(item) = inventory.get_mut(name) {
            item.available += quantity;
        }
        log::info!("Removed {} x {} from cart", quantity, name);
        Ok(())
    }

    /// Empties the cart and returns everything to the inventory.
    pub fn clear(&mut self, inventory: &mut SessionInventory) {
        for (name, quantity) in self.lines.drain(..) {
            if let Some(item) = inventory.get_mut(&name) {
                item.available += quantity;
            }
        }
    }

    pub fn lines(&self, inventory: &SessionInventory) -> Vec<CartLine> {
        self.lines
            .iter()
            .filter_map(|(name, quantity)| {
                let price = inventory.price(name)?;
                Some(CartLine {
                    name: name.clone(),
                    quantity: *quantity,
                    price,
                    total: price * *quantity,
                })
            })
            .collect()
    }

    pub fn total(&self, inventory: &SessionInventory) -> Money {
        self.lines(inventory).into_iter().map(|l| l.total).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    EmptyCart,
    InsufficientFunds { balance: Money, total: Money },
}

impl Display for CheckoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckoutError::EmptyCart => write!(f, "Cart is empty. Nothing to checkout."),
            CheckoutError::InsufficientFunds { balance, total } => write!(
                f,
                "Insufficient funds. Your balance: {}, total: {}",
                balance, total
            ),
        }
    }
}

impl std::error::Error for CheckoutError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub lines: Vec<CartLine>,
    pub total: Money,
    pub remaining: Money,
}

/// Pays for the cart from the account balance. Sold stock stays out of the
/// session inventory.
pub fn checkout(
    account: &mut Account,
    cart: &mut Cart,
    inventory: &SessionInventory,
) -> Result<Receipt, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let lines = cart.lines(inventory);
    let total = lines.iter().map(|l| l.total).sum();
    let remaining = account
        .balance
        .checked_sub(total)
        .ok_or(CheckoutError::InsufficientFunds {
            balance: account.balance,
            total,
        })?;

    account.balance = remaining;
    cart.lines.clear();
    log::info!("{} paid {} at checkout", account.username, total);
    Ok(Receipt {
        lines,
        total,
        remaining,
    })
}

pub fn fund(account: &mut Account, amount: Money) -> Money {
    account.balance += amount;
    log::info!("{} funded wallet with {}", account.username, amount);
    account.balance
}
