//! Customer-facing reply texts
//!
//! Replies mix English and Roman Urdu the way customers write to us.

use order_engine_config::constants::orders::{CURRENCY, PREPARATION_WINDOW};
use order_engine_core::{
    AssignedOutlet, Branch, CatalogIndex, DraftOrder, ListOption, NearbyOption, OrderStatus,
    OutboundMessage,
};

pub const BRAND: &str = "Coffee Wagera";

/// Whole rupees with thousands separators, e.g. `1,250`
pub fn format_amount(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

fn price(amount: f64) -> String {
    format!("{} {}", CURRENCY, format_amount(amount))
}

pub fn welcome() -> OutboundMessage {
    OutboundMessage::List {
        header: format!(
            "☕ *{} Mein Aapka Swagat Hai!* 🎉\n\nAap kya karna pasand karenge?",
            BRAND
        ),
        options: vec![
            ListOption {
                number: 1,
                title: "Order Karein".to_string(),
                detail: "Type 'menu' aur apni pasand ka order dein".to_string(),
            },
            ListOption {
                number: 2,
                title: "Order Status".to_string(),
                detail: "Type 'track order <id>'".to_string(),
            },
            ListOption {
                number: 3,
                title: "Branches".to_string(),
                detail: "Type 'branches'".to_string(),
            },
        ],
        footer: "Ya seedha likhein, jaise '2 chai aur 1 samosa'".to_string(),
    }
}

/// Available items with a price, grouped by category in catalog order
pub fn menu(catalog: &CatalogIndex) -> String {
    let mut out = String::from("🍽️ *HAMARA MENU* 🍽️\n\n");
    let mut listed = 0;

    for category in catalog.categories() {
        let items: Vec<_> = catalog
            .available()
            .filter(|i| i.category == category && i.price > 0.0)
            .collect();
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("*{}*\n", category));
        for item in items {
            out.push_str(&format!("• {} - {}\n", item.name, price(item.price)));
            listed += 1;
        }
        out.push('\n');
    }

    if listed == 0 {
        return "❌ Maaf karein, filhal koi menu items available nahi hain.".to_string();
    }

    out.push_str(
        "🍴 *Order kaise karein:*\nBas type karein aap kya lena chahte hain!\n\n*Examples:*\n\
         • '2 chai aur 1 samosa'\n\
         • 'Mujhe 1 zinger burger chahiye'\n\
         • '2 cappuccino 1 cookie'\n\
         • 'Chai samosa'\n",
    );
    out
}

pub fn help() -> String {
    format!(
        "ℹ️ *{} Help*\n\n\
         • Order: type items, e.g. '2 cappuccino 1 cookie'\n\
         • 'menu' - full menu\n\
         • 'location: <address>' - share your delivery address\n\
         • 'nearby: <area> [within N km]' - restaurants near an area\n\
         • 'track order <id>' - order status\n\
         • 'branches' - our branches\n\
         • 'confirm' / 'cancel' - finish or drop your order",
        BRAND
    )
}

pub fn location_request() -> String {
    "📍 *Location Share Karein*\n\n\
     Meharbani karke apna location share karein. Issey hum aapke sabse qareeb restaurant mein order bhej sakenge.\n\n\
     Type karein: 'location: <aapka address>'\n\
     Example: 'location: House No 5, Sector G-9, Islamabad | instructions: ring the bell'\n\n\
     Shukriya! 😊"
        .to_string()
}

fn item_lines(order: &DraftOrder) -> String {
    order
        .lines
        .iter()
        .map(|l| format!("• {}x {} - {}", l.quantity, l.name, price(l.line_total())))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Shown when a draft is first created
pub fn draft_created(order: &DraftOrder) -> String {
    format!(
        "🛒 *Order #{}*\n\n{}\n────────────────\n💰 *Total: {}*",
        order.id,
        item_lines(order),
        price(order.total_amount())
    )
}

pub fn unresolved_items(labels: &[String]) -> String {
    format!("ℹ️ These items not found: {}", labels.join(", "))
}

/// Full summary before confirmation
pub fn order_summary(order: &DraftOrder) -> String {
    let mut out = format!(
        "📋 *ORDER SUMMARY*\n\n{}\n────────────────\n💰 *Total Amount: {}*\n",
        item_lines(order),
        price(order.total_amount())
    );

    if let Some(AssignedOutlet::Branch {
        name, distance_km, ..
    }) = &order.outlet
    {
        out.push_str(&format!("📍 *Nearest Branch: {}* ({:.1} km door)\n", name, distance_km));
    }
    if let Some(address) = &order.address {
        out.push_str(&format!("🏠 Address: {}\n", address));
    }
    if let Some(instructions) = &order.instructions {
        out.push_str(&format!("📝 Instructions: {}\n", instructions));
    }

    out.push_str(
        "\n✅ Order confirm karne ke liye 'confirm' type karein\n\
         ❌ Cancel karne ke liye 'cancel' type karein",
    );
    out
}

pub fn confirmation_reprompt() -> &'static str {
    "✅ Type 'confirm' to place order\n❌ Type 'cancel' to cancel"
}

/// Distance-ranked outlets. Selectable lists end with a "type its number" hint.
pub fn nearby_list(header: String, options: &[NearbyOption], selectable: bool) -> OutboundMessage {
    let options = options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            if option.is_own_branch() {
                ListOption {
                    number: i + 1,
                    title: format!("🏪 **{}**", option.name),
                    detail: format!("   📍 {} km\n   📞 {}", option.distance_km, option.phone),
                }
            } else {
                ListOption {
                    number: i + 1,
                    title: format!("🏠 **{}**", option.name),
                    detail: format!(
                        "   📍 {} km | 🍽️ {}",
                        option.distance_km,
                        option.cuisine.as_deref().unwrap_or("Restaurant")
                    ),
                }
            }
        })
        .collect();

    let mut footer = format!(
        "💡 **Recommendation:** For fastest delivery, choose {} branches (🏪).\n\
         📍 To view on map, visit: https://openstreetmap.org",
        BRAND
    );
    if selectable {
        footer.push_str("\n\nTo order from a specific restaurant, type its number (e.g., '1')");
    }

    OutboundMessage::List {
        header,
        options,
        footer,
    }
}

pub fn nearby_header() -> String {
    "📍 **NEARBY RESTAURANTS** 📍".to_string()
}

pub fn nearby_header_for(place: &str) -> String {
    format!("📍 **RESTAURANTS NEAR {}** 📍", place.to_uppercase())
}

pub fn no_restaurants_near(place: &str) -> String {
    format!("❌ No restaurants found near '{}'. Try a different location.", place)
}

pub fn nearby_prompt() -> String {
    "📍 To find nearby restaurants, type 'nearby:' followed by your area.\n\
     Example: 'nearby: Gulshan, Karachi' or 'nearby: F-7 Islamabad within 3 km'"
        .to_string()
}

pub fn share_address_prompt() -> String {
    "📍 Please share your location using WhatsApp's location feature or type your address."
        .to_string()
}

pub fn invalid_choice(max: usize) -> String {
    format!("❌ Invalid choice. Please select a number between 1-{}", max)
}

pub fn choice_reprompt(max: usize) -> String {
    format!(
        "🔢 Please reply with the number of a restaurant (1-{}), or share a different address.",
        max
    )
}

pub fn location_expired() -> String {
    "❌ Location not found. Please share your location again.".to_string()
}

pub fn third_party_selected(option: &NearbyOption) -> String {
    format!(
        "🍽️ You selected: **{}**\n📍 {} km away\n\n\
         Note: For ordering from other restaurants, please contact them directly:\n\
         📞 Phone: {}\n📍 Address: {}\n\n\
         To order from {}, please select our branches (🏪).",
        option.name, option.distance_km, option.phone, option.address, BRAND
    )
}

pub fn order_confirmed(order: &DraftOrder) -> String {
    format!(
        "✅ Order #{} confirmed! Total: {}\nYour order will be ready in {}.",
        order.id,
        price(order.total_amount()),
        PREPARATION_WINDOW
    )
}

pub fn order_cancelled() -> String {
    "❌ Order cancelled. You can start a new order.".to_string()
}

pub fn no_pending_order() -> String {
    "❌ No pending order found. Start a new order.".to_string()
}

pub fn place_order_first() -> String {
    "❌ Please place an order first, then share your location.".to_string()
}

pub fn track_prompt() -> String {
    "📦 To track your order, please provide your order ID.\nExample: 'track order 1'".to_string()
}

pub fn order_status(order: &DraftOrder) -> String {
    let status = match order.status {
        OrderStatus::Confirmed => "👨‍🍳 Aapka order tayyar ho raha hai",
        OrderStatus::Draft => "⏳ Aapka order receive ho gaya hai",
        OrderStatus::Cancelled => "❌ Yeh order cancel ho chuka hai",
    };
    let branch = order
        .outlet
        .as_ref()
        .map(AssignedOutlet::name)
        .unwrap_or("Abhi assign nahi hui");
    format!("📦 *Order #{} Status*\n\n{}\n📍 Branch: {}", order.id, status, branch)
}

pub fn order_not_found(order_id: u64) -> String {
    format!("❌ Order #{} not found.", order_id)
}

pub fn branches<'a>(branches: impl IntoIterator<Item = &'a Branch>) -> String {
    let mut out = String::from("📍 **OUR BRANCHES** 📍\n\n");
    let mut listed = 0;
    for branch in branches {
        out.push_str(&format!(
            "**{}**\n🏠 {}\n📞 {}\n\n",
            branch.name, branch.address, branch.phone
        ));
        listed += 1;
    }
    if listed == 0 {
        return "❌ No branches available at the moment.".to_string();
    }
    out.trim_end().to_string()
}

pub fn storage_unavailable() -> String {
    "⚠️ Maaf karein, abhi hum aapka message process nahi kar sake. Thori dair baad dobara koshish karein."
        .to_string()
}
