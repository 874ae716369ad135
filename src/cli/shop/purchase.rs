use anyhow::Result;
use console::style;

use super::{Prompt, Shop};
use crate::{
    accounts::AccountStore,
    cart::{self, Cart, CheckoutError, SessionInventory},
    query,
};

/// State of one visit to the purchase menu. Nothing here outlives it.
struct Session {
    inventory: SessionInventory,
    cart: Cart,
}

impl<S: AccountStore, P: Prompt> Shop<S, P> {
    pub(super) fn purchase_menu(&mut self, username: &str) -> Result<()> {
        let mut session = Session {
            inventory: SessionInventory::new(&self.catalog, self.settings.default_stock),
            cart: Cart::new(),
        };

        loop {
            self.banner("PURCHASE MENU")?;
            match self.choose(&[
                "Search Items",
                "Manage Cart",
                "Checkout",
                "Exit Purchase Menu",
            ])? {
                1 => self.search_items(&mut session)?,
                2 => self.manage_cart(&mut session)?,
                3 => self.checkout(username, &mut session)?,
                _ => return Ok(()),
            }
        }
    }

    fn search_items(&mut self, session: &mut Session) -> Result<()> {
        loop {
            let text = self
                .prompt
                .ask("\nEnter search query (or 'back' to return): ")?;
            if text.to_lowercase() == "back" {
                return Ok(());
            }

            let results: Vec<String> = query::search(&text, session.inventory.names())
                .into_iter()
                .map(str::to_owned)
                .collect();
            log::debug!("Query {:?} matched {} items", text, results.len());

            if results.is_empty() {
                self.prompt.say("No items found matching your search.")?;
                continue;
            }

            self.prompt.say("\nSearch Results:")?;
            self.list_items(session, &results)?;

            match self.choose(&["Search Again", "Add Items to Cart", "Exit Search Menu"])? {
                1 => continue,
                2 => {
                    self.add_to_cart(session, &results)?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn list_items(&mut self, session: &Session, names: &[String]) -> Result<()> {
        for (i, name) in names.iter().enumerate() {
            if let Some(item) = session.inventory.get(name) {
                self.prompt.say(&format!(
                    "{}. {} - {} ({} left)",
                    i + 1,
                    item.name,
                    style(item.price).cyan(),
                    item.available
                ))?;
            }
        }
        Ok(())
    }

    /// Asks for one of `names` and a quantity, retrying until something is
    /// added or the shopper enters 0.
    fn add_to_cart(&mut self, session: &mut Session, names: &[String]) -> Result<()> {
        loop {
            let Some(n) = self.ask_number("\nEnter item number to add (or 0 to go back): ")? else {
                continue;
            };
            if n == 0 {
                return Ok(());
            }
            let Some(name) = names.get(n as usize - 1) else {
                self.prompt.say("Invalid item number.")?;
                continue;
            };
            let Some(quantity) = self.ask_number(&format!("How many {}? ", name))? else {
                continue;
            };

            match session.cart.add(&mut session.inventory, name, quantity) {
                Ok(()) => {
                    return self
                        .prompt
                        .say(&format!("Added {} x {} to cart", quantity, name));
                }
                Err(err) => self.prompt.say(&err.to_string())?,
            }
        }
    }

    fn show_cart(&mut self, session: &Session) -> Result<()> {
        if session.cart.is_empty() {
            return self.prompt.say("Cart is empty.");
        }
        self.prompt.say("\nCart Contents:")?;
        for (i, line) in session.cart.lines(&session.inventory).iter().enumerate() {
            self.prompt.say(&format!(
                "{}. {}\n   Quantity: {}, Price: {}, Total: {}",
                i + 1,
                line.name,
                line.quantity,
                line.price,
                line.total
            ))?;
        }
        self.prompt.say(&format!(
            "Cart total: {}",
            style(session.cart.total(&session.inventory)).bold()
        ))
    }

    fn manage_cart(&mut self, session: &mut Session) -> Result<()> {
        loop {
            self.banner("MANAGE CART")?;
            self.show_cart(session)?;
            match self.choose(&[
                "View Items in Cart",
                "Add Items to Cart",
                "Remove Items from Cart",
                "Clear Cart",
                "Exit Manage Cart Menu",
            ])? {
                1 => continue,
                2 => {
                    let names: Vec<String> =
                        session.inventory.names().map(str::to_owned).collect();
                    self.prompt.say("\nAvailable Items:")?;
                    self.list_items(session, &names)?;
                    self.add_to_cart(session, &names)?;
                }
                3 => self.remove_from_cart(session)?,
                4 => {
                    session.cart.clear(&mut session.inventory);
                    self.prompt.say("Cart cleared.")?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn remove_from_cart(&mut self, session: &mut Session) -> Result<()> {
        if session.cart.is_empty() {
            return self.prompt.say("Cart is empty.");
        }
        let names: Vec<String> = session.cart.names().map(str::to_owned).collect();
        self.prompt.say("\nItems in Cart:")?;
        for (i, name) in names.iter().enumerate() {
            self.prompt.say(&format!(
                "{}. {} (qty: {})",
                i + 1,
                name,
                session.cart.quantity(name)
            ))?;
        }

        let Some(n) = self.ask_number("\nEnter item number to remove (or 0 to go back): ")? else {
            return Ok(());
        };
        if n == 0 {
            return Ok(());
        }
        let Some(name) = names.get(n as usize - 1) else {
            return self.prompt.say("Invalid item number.");
        };
        let Some(quantity) = self.ask_number("How many to remove? ")? else {
            return Ok(());
        };
        match session.cart.remove(&mut session.inventory, name, quantity) {
            Ok(()) => self.prompt.say("Item removed from cart."),
            Err(err) => self.prompt.say(&err.to_string()),
        }
    }

    fn checkout(&mut self, username: &str, session: &mut Session) -> Result<()> {
        if session.cart.is_empty() {
            return self.prompt.say(&CheckoutError::EmptyCart.to_string());
        }

        self.banner("CHECKOUT")?;
        self.prompt.say("\nCart Summary:")?;
        for line in session.cart.lines(&session.inventory) {
            self.prompt.say(&format!(
                "{}: {} x {} = {}",
                line.name, line.quantity, line.price, line.total
            ))?;
        }
        self.prompt.say(&format!(
            "\nTotal: {}",
            style(session.cart.total(&session.inventory)).bold()
        ))?;

        if !self.confirm("Proceed to payment?")? {
            return self.prompt.say("Checkout cancelled.");
        }

        let account = self.account_mut(username)?;
        match cart::checkout(account, &mut session.cart, &session.inventory) {
            Ok(receipt) => {
                self.persist()?;
                self.prompt.say(&format!(
                    "\nPayment successful! Remaining balance: {}",
                    style(receipt.remaining).green().bold()
                ))
            }
            Err(err) => self.error(&err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{shop, STRONG};
    use crate::money::Money;

    fn signed_in(mut answers: Vec<&'static str>) -> Vec<&'static str> {
        let mut script = vec!["1", "ada", STRONG, "2"];
        script.append(&mut answers);
        // leave purchase menu, main menu and login menu
        script.extend(["4", "4", "3"]);
        script
    }

    #[test]
    fn search_lists_matches_in_catalog_order() {
        let mut shop = shop(&signed_in(vec!["1", "apple", "3"]));
        shop.run().unwrap();
        let transcript = shop.prompt().transcript();
        assert!(transcript.contains(
            "1. Apple iPhone 14 - NGN 850,000.00 (5 left)\n2. Apple Watch Series 8 - NGN 300,000.00 (5 left)"
        ));
        assert!(!transcript.contains("Samsung Galaxy Buds - "));
    }

    #[test]
    fn search_without_hits_asks_again() {
        let mut shop = shop(&signed_in(vec!["1", "nonexistent product", "back"]));
        shop.run().unwrap();
        assert!(shop
            .prompt()
            .transcript()
            .contains("No items found matching your search."));
    }

    #[test]
    fn buy_from_search_results() {
        let mut shop = shop(&signed_in(vec![
            "1", "usb cable", "2", "1", "4", "back", // 4 cables
            "3", "yes",
        ]));
        shop.run().unwrap();
        let transcript = shop.prompt().transcript();
        assert!(transcript.contains("Added 4 x USB-C Cable to cart"));
        assert!(transcript.contains("USB-C Cable: 4 x NGN 2,500.00 = NGN 10,000.00"));
        assert!(transcript.contains("Payment successful! Remaining balance: NGN 40,000.00"));
        assert_eq!(
            shop.accounts().get("ada").unwrap().balance,
            Money::from_naira(40000)
        );
        assert_eq!(
            shop.store.saved().unwrap()[0].balance,
            Money::from_naira(40000)
        );
    }

    #[test]
    fn stock_limits_additions() {
        let mut shop = shop(&signed_in(vec![
            "1", "buds", "2", "9", "1", "6", "1", "5", "back",
        ]));
        shop.run().unwrap();
        let transcript = shop.prompt().transcript();
        assert!(transcript.contains("Invalid item number."));
        assert!(transcript.contains("Only 5 x Samsung Galaxy Buds left in stock."));
        assert!(transcript.contains("Added 5 x Samsung Galaxy Buds to cart"));
    }

    #[test]
    fn insufficient_funds_keeps_cart() {
        let mut shop = shop(&signed_in(vec![
            "1", "iphone", "2", "1", "1", "back", "3", "yes", "2", "5",
        ]));
        shop.run().unwrap();
        let transcript = shop.prompt().transcript();
        assert!(transcript.contains("ERROR: Insufficient funds."));
        assert!(transcript.contains("1. Apple iPhone 14\n   Quantity: 1"));
        assert_eq!(
            shop.accounts().get("ada").unwrap().balance,
            Money::from_naira(50000)
        );
    }

    #[test]
    fn manage_cart_add_remove_clear() {
        let mut shop = shop(&signed_in(vec![
            "2", "2", "4", "2", // 2 cables from the full listing
            "3", "1", "1", // remove one
            "1", "4", "5", "3",
        ]));
        shop.run().unwrap();
        let transcript = shop.prompt().transcript();
        assert!(transcript.contains("4. USB-C Cable - NGN 2,500.00 (5 left)"));
        assert!(transcript.contains("Added 2 x USB-C Cable to cart"));
        assert!(transcript.contains("Item removed from cart."));
        assert!(transcript.contains("1. USB-C Cable\n   Quantity: 1"));
        assert!(transcript.contains("Cart cleared."));
        assert!(transcript.contains("Cart is empty. Nothing to checkout."));
    }

    #[test]
    fn declined_checkout_changes_nothing() {
        let mut shop = shop(&signed_in(vec!["1", "cable", "2", "1", "1", "back", "3", "no"]));
        shop.run().unwrap();
        assert!(shop.prompt().transcript().contains("Checkout cancelled."));
        assert_eq!(
            shop.accounts().get("ada").unwrap().balance,
            Money::from_naira(50000)
        );
    }
}
