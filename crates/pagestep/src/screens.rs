//! Sauce Demo storefront screens
//!
//! Reference catalog for <https://www.saucedemo.com/>. Every screen past the
//! login form extends [`APP_SHELL`], which declares the header and side menu.

use crate::context::ScreenCatalog;
use crate::locator::Locator;
use crate::result::DispatchResult;
use crate::screen::{BehaviorDecl, LocatorDecl, Screen, ScreenType};

/// Storefront entry point
pub const BASE_URL: &str = "https://www.saucedemo.com/";

const MENU_BUTTON: Locator = Locator::id("react-burger-menu-btn");
const LOGOUT_BUTTON: Locator = Locator::id("logout_sidebar_link");
const CART_LINK: Locator = Locator::class_name("shopping_cart_link");

fn open_login(screen: &Screen) -> DispatchResult<()> {
    screen.navigate_to(BASE_URL)
}

fn open_cart(screen: &Screen) -> DispatchResult<()> {
    let driver = screen.driver();
    let link = driver.wait_until_clickable(&CART_LINK)?;
    driver.click(&link)
}

fn log_out(screen: &Screen) -> DispatchResult<()> {
    let driver = screen.driver();
    let menu = driver.wait_until_clickable(&MENU_BUTTON)?;
    driver.click(&menu)?;
    let logout = driver.wait_until_clickable(&LOGOUT_BUTTON)?;
    driver.click(&logout)
}

/// Header and side menu shared by every signed-in screen
pub static APP_SHELL: ScreenType = ScreenType {
    name: "AppShell",
    parent: None,
    locators: &[
        LocatorDecl::new("MENU_BUTTON", MENU_BUTTON),
        LocatorDecl::new("LOGOUT_BUTTON", LOGOUT_BUTTON),
        LocatorDecl::new("CART_BADGE", Locator::class_name("shopping_cart_badge")),
        LocatorDecl::new("CART_LINK", CART_LINK),
        LocatorDecl::new("PAGE_TITLE", Locator::class_name("title")),
    ],
    behaviors: &[
        BehaviorDecl::new("openCart", open_cart),
        BehaviorDecl::new("logout", log_out),
    ],
};

/// Login form
pub static LOGIN_PAGE: ScreenType = ScreenType {
    name: "LoginPage",
    parent: None,
    locators: &[
        LocatorDecl::new("USERNAME", Locator::id("user-name")),
        LocatorDecl::new("PASSWORD", Locator::id("password")),
        LocatorDecl::new("LOGIN_BUTTON", Locator::id("login-button")),
        LocatorDecl::new("ERROR_MESSAGE", Locator::css("[data-test='error']")),
    ],
    behaviors: &[BehaviorDecl::new("navigate", open_login)],
};

/// Product listing
pub static INVENTORY_PAGE: ScreenType = ScreenType {
    name: "InventoryPage",
    parent: Some(&APP_SHELL),
    locators: &[
        LocatorDecl::new("INVENTORY_CONTAINER", Locator::class_name("inventory_list")),
        LocatorDecl::new("PRODUCT_ITEMS", Locator::class_name("inventory_item")),
        LocatorDecl::new("PRODUCT_NAME", Locator::class_name("inventory_item_name")),
        LocatorDecl::new("PRODUCT_PRICE", Locator::class_name("inventory_item_price")),
        LocatorDecl::new("PRODUCT_DESCRIPTION", Locator::class_name("inventory_item_desc")),
        LocatorDecl::new("PRODUCT_IMAGE", Locator::xpath("//img[@class='inventory_item_img']")),
        LocatorDecl::new(
            "ADD_TO_CART_BUTTON",
            Locator::xpath("//button[contains(text(), 'Add to cart')]"),
        ),
        LocatorDecl::new(
            "REMOVE_FROM_CART_BUTTON",
            Locator::xpath("//button[contains(text(), 'Remove')]"),
        ),
        LocatorDecl::new("SORT_DROPDOWN", Locator::css("[data-test='product_sort_container']")),
        LocatorDecl::new("SORT_ATO_Z", Locator::xpath("//option[@value='az']")),
        LocatorDecl::new("SORT_ZTO_A", Locator::xpath("//option[@value='za']")),
        LocatorDecl::new("SORT_PRICE_LOW_HIGH", Locator::xpath("//option[@value='lohi']")),
        LocatorDecl::new("SORT_PRICE_HIGH_LOW", Locator::xpath("//option[@value='hilo']")),
    ],
    behaviors: &[],
};

/// Shopping cart
pub static CART_PAGE: ScreenType = ScreenType {
    name: "CartPage",
    parent: Some(&APP_SHELL),
    locators: &[
        LocatorDecl::new("CART_ITEM", Locator::class_name("cart_item")),
        LocatorDecl::new("ITEM_NAME", Locator::class_name("inventory_item_name")),
        LocatorDecl::new("ITEM_PRICE", Locator::class_name("inventory_item_price")),
        LocatorDecl::new("ITEM_QUANTITY", Locator::class_name("cart_quantity")),
        LocatorDecl::new("REMOVE_BUTTON", Locator::xpath("//button[contains(text(), 'Remove')]")),
        LocatorDecl::new("CHECKOUT_BUTTON", Locator::id("checkout")),
        LocatorDecl::new("CONTINUE_SHOPPING_BUTTON", Locator::id("continue-shopping")),
    ],
    behaviors: &[],
};

/// Checkout step one: shipping information
pub static CHECKOUT_PAGE: ScreenType = ScreenType {
    name: "CheckoutPage",
    parent: Some(&APP_SHELL),
    locators: &[
        LocatorDecl::new("FIRST_NAME", Locator::id("first-name")),
        LocatorDecl::new("LAST_NAME", Locator::id("last-name")),
        LocatorDecl::new("POSTAL_CODE", Locator::id("postal-code")),
        LocatorDecl::new("CONTINUE_BUTTON", Locator::id("continue")),
        LocatorDecl::new("CANCEL_BUTTON", Locator::id("cancel")),
        LocatorDecl::new("ERROR_MESSAGE", Locator::css("[data-test='error']")),
    ],
    behaviors: &[],
};

/// Checkout step two: order overview
pub static CHECKOUT_SUMMARY_PAGE: ScreenType = ScreenType {
    name: "CheckoutSummaryPage",
    parent: Some(&APP_SHELL),
    locators: &[
        LocatorDecl::new("CART_ITEM", Locator::class_name("cart_item")),
        LocatorDecl::new("ITEM_NAME", Locator::class_name("inventory_item_name")),
        LocatorDecl::new("ITEM_PRICE", Locator::class_name("inventory_item_price")),
        LocatorDecl::new("SUBTOTAL", Locator::class_name("summary_subtotal_label")),
        LocatorDecl::new("TAX", Locator::class_name("summary_tax_label")),
        LocatorDecl::new("TOTAL", Locator::class_name("summary_total_label")),
        LocatorDecl::new("FINISH_BUTTON", Locator::id("finish")),
        LocatorDecl::new("CANCEL_BUTTON", Locator::id("cancel")),
    ],
    behaviors: &[],
};

/// Order complete
pub static CONFIRMATION_PAGE: ScreenType = ScreenType {
    name: "ConfirmationPage",
    parent: Some(&APP_SHELL),
    locators: &[
        LocatorDecl::new("SUCCESS_MESSAGE", Locator::class_name("complete-header")),
        LocatorDecl::new("CONFIRMATION_ICON", Locator::class_name("pony_express")),
        LocatorDecl::new("ORDER_SUMMARY_SECTION", Locator::class_name("complete-text")),
        LocatorDecl::new("BACK_TO_PRODUCTS_BUTTON", Locator::id("back-to-products")),
    ],
    behaviors: &[],
};

/// Every storefront screen a scenario can address by name
#[must_use]
pub fn saucedemo_catalog() -> ScreenCatalog {
    ScreenCatalog::new()
        .with(&LOGIN_PAGE)
        .with(&INVENTORY_PAGE)
        .with(&CART_PAGE)
        .with(&CHECKOUT_PAGE)
        .with(&CHECKOUT_SUMMARY_PAGE)
        .with(&CONFIRMATION_PAGE)
}
