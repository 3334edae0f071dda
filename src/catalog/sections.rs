//! Stock storefront sections.

use crate::schema::{BlockSchema, Preset, PresetBlock, SectionCategory, SectionSchema};
use crate::settings::{
    Condition, ConditionOperator, SettingDescriptor, SettingGroup, SettingKind, SettingValue, settings_map,
};

fn text(id: &str, label: &str, default: &str) -> SettingDescriptor {
    SettingDescriptor::new(SettingKind::Text, id, label).with_default(default)
}

fn textarea(id: &str, label: &str, default: &str) -> SettingDescriptor {
    SettingDescriptor::new(SettingKind::Textarea, id, label).with_default(default)
}

fn link(id: &str, label: &str) -> SettingDescriptor {
    SettingDescriptor::new(SettingKind::Url, id, label)
}

fn toggle(id: &str, label: &str, default: bool) -> SettingDescriptor {
    SettingDescriptor::new(SettingKind::Checkbox, id, label)
        .with_default(default)
        .in_group(SettingGroup::Behavior)
}

fn color(id: &str, label: &str, default: &str) -> SettingDescriptor {
    SettingDescriptor::new(SettingKind::Color, id, label)
        .with_default(default)
        .in_group(SettingGroup::Style)
}

fn columns(id: &str, label: &str, choices: &[&str], default: &str) -> SettingDescriptor {
    SettingDescriptor::new(SettingKind::Select, id, label)
        .with_options(choices.iter().map(|n| (*n, format!("{n} columns"))))
        .with_default(default)
        .in_group(SettingGroup::Layout)
}

fn logo_width(id: &str, label: &str, default: i32) -> SettingDescriptor {
    SettingDescriptor::new(SettingKind::Range, id, label)
        .with_range(30.0, 450.0, 5.0)
        .with_unit("px")
        .with_default(default)
        .in_group(SettingGroup::Layout)
}

fn link_block(type_id: &str, title: &str, link_to: &str) -> PresetBlock {
    PresetBlock::new(type_id, settings_map([("title", title), ("link", link_to)]))
}

pub fn header() -> SectionSchema {
    SectionSchema::new("header", "Site header", SectionCategory::Header)
        .describe("Logo, navigation and cart")
        .setting(
            SettingDescriptor::new(SettingKind::Select, "header_design", "Header design")
                .with_options([
                    ("logo-center-menu-left", "Logo centred"),
                    ("both-center", "Logo centred with second menu"),
                    ("logo-left-menu-center", "Logo left"),
                    ("logo-center__2l", "Logo centred, two rows"),
                    ("logo-left__2l", "Logo left, two rows"),
                ])
                .with_default("logo-center-menu-left")
                .in_group(SettingGroup::Layout),
        )
        .setting(
            SettingDescriptor::new(SettingKind::Select, "container", "Container")
                .with_options([
                    ("container-fluid", "Default"),
                    ("w-full", "Full width"),
                    ("container", "Boxed"),
                ])
                .with_default("container-fluid")
                .in_group(SettingGroup::Layout),
        )
        .setting(toggle("header_sticky", "Stick to top", true))
        .setting(
            toggle("transparent_on_top", "Transparent over first section", false)
                .with_condition(Condition::equals("header_sticky", true)),
        )
        .setting(SettingDescriptor::heading("Logo"))
        .setting(text("logo_text", "Logo text", "My Store"))
        .setting(SettingDescriptor::new(SettingKind::Image, "logo", "Logo"))
        .setting(SettingDescriptor::new(SettingKind::Image, "logo_mobile", "Mobile logo"))
        .setting(
            SettingDescriptor::new(SettingKind::Image, "logo_transparent", "Transparent logo")
                .with_condition(Condition::equals("transparent_on_top", true)),
        )
        .setting(logo_width("logo_max_width", "Logo width (desktop)", 145))
        .setting(
            logo_width("sticky_logo_max_width", "Logo width (sticky)", 145)
                .with_condition(Condition::equals("header_sticky", true)),
        )
        .setting(logo_width("mobile_logo_max_width", "Logo width (mobile)", 110))
        .setting(SettingDescriptor::heading("Menus"))
        .setting(SettingDescriptor::new(SettingKind::MenuPicker, "main_menu", "Main menu"))
        .setting(
            SettingDescriptor::new(SettingKind::MenuPicker, "secondary_menu", "Secondary menu")
                .with_condition(Condition::new(
                    "header_design",
                    ConditionOperator::In,
                    vec!["both-center", "logo-center__2l", "logo-left__2l"],
                )),
        )
        .setting(SettingDescriptor::new(SettingKind::MenuPicker, "mobile_menu", "Mobile menu"))
        .setting(toggle("uppercase_parent_level", "Uppercase top level", true))
        .setting(SettingDescriptor::heading("Extras"))
        .setting(
            SettingDescriptor::new(SettingKind::Select, "search", "Search")
                .with_options([
                    ("hide", "Hidden"),
                    ("show_icon", "Icon"),
                    ("show_full", "Full search box"),
                ])
                .with_default("hide")
                .in_group(SettingGroup::Behavior),
        )
        .setting(toggle("show_account_icon", "Account icon", true))
        .setting(toggle("show_cart_icon", "Cart icon", true))
        .setting(toggle("show_wishlist_icon", "Wishlist icon", true))
        .setting(toggle("show_currency_switcher", "Currency switcher", true))
        .setting(toggle("show_country_selector", "Country selector", false))
        .setting(toggle("show_language_switcher", "Language switcher", true))
        .block_type(
            BlockSchema::new("menu_item", "Menu item")
                .setting(text("title", "Title", "New page"))
                .setting(link("link", "Link"))
                .setting(toggle("open_new_tab", "Open in new tab", false)),
        )
        .max_blocks(8)
        .preset(
            Preset::new(
                "Default",
                settings_map([
                    ("logo_text", SettingValue::text("My Store")),
                    ("header_sticky", SettingValue::Bool(true)),
                ]),
            )
            .block(link_block("menu_item", "Home", "/"))
            .block(link_block("menu_item", "Products", "/products"))
            .block(link_block("menu_item", "About", "/about"))
            .block(link_block("menu_item", "Contact", "/contact")),
        )
}

pub fn announcement() -> SectionSchema {
    SectionSchema::new("announcement", "Announcement bar", SectionCategory::Header)
        .describe("Short notice above the header")
        .setting(SettingDescriptor::heading("Content"))
        .setting(text(
            "message",
            "Message",
            "Free shipping on orders over $50 | Support 24/7",
        ))
        .setting(link("link", "Link (optional)"))
        .setting(SettingDescriptor::heading("Design"))
        .setting(color("background_color", "Background", "#1f2937"))
        .setting(color("text_color", "Text colour", "#ffffff"))
        .setting(
            SettingDescriptor::new(SettingKind::Select, "text_size", "Text size")
                .with_options([
                    ("text-xs", "Extra small"),
                    ("text-sm", "Small"),
                    ("text-base", "Regular"),
                    ("text-lg", "Large"),
                ])
                .with_default("text-sm")
                .in_group(SettingGroup::Style),
        )
        .preset(Preset::new(
            "Default",
            settings_map([
                ("message", "Free shipping on orders over $50 | Support 24/7"),
                ("background_color", "#1f2937"),
                ("text_color", "#ffffff"),
                ("text_size", "text-sm"),
            ]),
        ))
}

pub fn hero() -> SectionSchema {
    SectionSchema::new("hero", "Hero", SectionCategory::Hero)
        .describe("Large banner with headline and calls to action")
        .setting(SettingDescriptor::heading("Content"))
        .setting(text("subtitle", "Subtitle", "The new collection"))
        .setting(text("title", "Title", "Discover your style"))
        .setting(textarea(
            "description",
            "Description",
            "Quality pieces, distinctive design and everyday comfort.",
        ))
        .setting(SettingDescriptor::new(
            SettingKind::Image,
            "background_image",
            "Background image",
        ))
        .setting(SettingDescriptor::heading("Buttons"))
        .setting(text("button_primary_text", "Primary button", "Shop now"))
        .setting(link("button_primary_link", "Primary link").with_default("/products"))
        .setting(text("button_secondary_text", "Secondary button", "Browse collections"))
        .setting(link("button_secondary_link", "Secondary link").with_default("/collections"))
        .setting(SettingDescriptor::heading("Layout and design"))
        .setting(
            SettingDescriptor::new(SettingKind::Select, "layout", "Layout")
                .with_options([("center", "Centred"), ("split", "Split"), ("overlay", "Overlay")])
                .with_default("split")
                .in_group(SettingGroup::Layout),
        )
        .setting(
            SettingDescriptor::new(SettingKind::Select, "height", "Height")
                .with_options([
                    ("small", "Small (400px)"),
                    ("medium", "Medium (500px)"),
                    ("large", "Large (600px)"),
                    ("full", "Full screen"),
                ])
                .with_default("large")
                .in_group(SettingGroup::Layout),
        )
        .setting(color("background_color", "Background", "#f9fafb"))
        .setting(toggle("use_primary_color", "Primary colour for main button", true))
        .setting(toggle("use_secondary_color", "Secondary colour for second button", true))
        .setting(
            SettingDescriptor::new(SettingKind::Select, "text_alignment", "Text alignment")
                .with_options([("left", "Left"), ("center", "Centre"), ("right", "Right")])
                .with_default("right")
                .in_group(SettingGroup::Style),
        )
        .block_type(
            BlockSchema::new("stat", "Statistic")
                .setting(text("value", "Value", "100+"))
                .setting(text("label", "Label", "Products")),
        )
        .max_blocks(4)
        .preset(
            Preset::new(
                "Default",
                settings_map([
                    ("subtitle", "The new collection"),
                    ("title", "Discover your style"),
                    ("button_primary_text", "Shop now"),
                    ("button_primary_link", "/products"),
                    ("button_secondary_text", "Browse collections"),
                    ("button_secondary_link", "/collections"),
                    ("layout", "split"),
                    ("height", "large"),
                    ("background_color", "#f9fafb"),
                    ("text_alignment", "right"),
                ]),
            )
            .block(stat("100+", "Products"))
            .block(stat("5K+", "Customers"))
            .block(stat("24/7", "Support")),
        )
}

fn stat(value: &str, label: &str) -> PresetBlock {
    PresetBlock::new("stat", settings_map([("value", value), ("label", label)]))
}

pub fn categories() -> SectionSchema {
    SectionSchema::new("categories", "Category grid", SectionCategory::Products)
        .describe("Grid of featured categories")
        .setting(SettingDescriptor::heading("Content"))
        .setting(text("subtitle", "Subtitle", "Popular categories"))
        .setting(text("title", "Title", "Explore our categories"))
        .setting(textarea(
            "description",
            "Description",
            "A wide range of quality products in every category you love",
        ))
        .setting(SettingDescriptor::heading("Layout"))
        .setting(columns("columns_desktop", "Desktop columns", &["2", "3", "4", "5"], "4"))
        .setting(columns("columns_mobile", "Mobile columns", &["1", "2"], "2"))
        .setting(toggle("show_product_count", "Show product count", true))
        .setting(SettingDescriptor::heading("Design"))
        .setting(color("background_color", "Background", "#f9fafb"))
        .block_type(
            BlockSchema::new("category", "Category")
                .setting(text("title", "Name", "New category"))
                .setting(SettingDescriptor::new(SettingKind::Image, "image", "Image"))
                .setting(link("link", "Link")),
        )
        .max_blocks(8)
        .preset(
            Preset::new(
                "Default",
                settings_map([
                    ("subtitle", SettingValue::text("Popular categories")),
                    ("title", SettingValue::text("Explore our categories")),
                    ("columns_desktop", SettingValue::text("4")),
                    ("columns_mobile", SettingValue::text("2")),
                    ("show_product_count", SettingValue::Bool(true)),
                    ("background_color", SettingValue::text("#f9fafb")),
                ]),
            )
            .block(link_block("category", "Shirts", "/collections/shirts"))
            .block(link_block("category", "Pants", "/collections/pants"))
            .block(link_block("category", "Shoes", "/collections/shoes"))
            .block(link_block("category", "Accessories", "/collections/accessories")),
        )
}

pub fn featured_products() -> SectionSchema {
    SectionSchema::new("featured_products", "Featured products", SectionCategory::Products)
        .describe("Product grid fed from a chosen source")
        .setting(SettingDescriptor::heading("Content"))
        .setting(text("subtitle", "Subtitle", "Best sellers"))
        .setting(text("title", "Title", "Our top products"))
        .setting(textarea(
            "description",
            "Description",
            "The products our customers love most",
        ))
        .setting(SettingDescriptor::heading("Products"))
        .setting(
            SettingDescriptor::new(SettingKind::Select, "product_source", "Product source")
                .with_options([
                    ("featured", "Featured"),
                    ("newest", "Newest"),
                    ("best_selling", "Best selling"),
                    ("on_sale", "On sale"),
                    ("collection", "Collection"),
                ])
                .with_default("featured"),
        )
        .setting(
            SettingDescriptor::new(SettingKind::CollectionPicker, "collection", "Collection")
                .with_condition(Condition::equals("product_source", "collection")),
        )
        .setting(
            SettingDescriptor::new(SettingKind::Number, "products_to_show", "Products to show")
                .with_range(2.0, 12.0, 1.0)
                .with_default(8),
        )
        .setting(SettingDescriptor::heading("Layout"))
        .setting(columns("columns_desktop", "Desktop columns", &["2", "3", "4", "5"], "4"))
        .setting(columns("columns_mobile", "Mobile columns", &["1", "2"], "2"))
        .setting(toggle("show_view_all", "Show \"view all\" button", true))
        .setting(
            text("view_all_text", "\"View all\" label", "View all products")
                .with_condition(Condition::equals("show_view_all", true)),
        )
        .setting(
            link("view_all_link", "\"View all\" link")
                .with_default("/products")
                .with_condition(Condition::equals("show_view_all", true)),
        )
        .setting(SettingDescriptor::heading("Design"))
        .setting(color("background_color", "Background", "#ffffff"))
        .preset(Preset::new(
            "Default",
            settings_map([
                ("subtitle", SettingValue::text("Best sellers")),
                ("title", SettingValue::text("Our top products")),
                ("product_source", SettingValue::text("featured")),
                ("products_to_show", SettingValue::Number(8.0)),
                ("columns_desktop", SettingValue::text("4")),
                ("columns_mobile", SettingValue::text("2")),
                ("show_view_all", SettingValue::Bool(true)),
                ("view_all_text", SettingValue::text("View all products")),
                ("view_all_link", SettingValue::text("/products")),
                ("background_color", SettingValue::text("#ffffff")),
            ]),
        ))
}

pub fn newsletter() -> SectionSchema {
    SectionSchema::new("newsletter", "Newsletter signup", SectionCategory::Marketing)
        .describe("Email signup form")
        .setting(SettingDescriptor::heading("Content"))
        .setting(text("title", "Title", "Join our newsletter"))
        .setting(textarea(
            "description",
            "Description",
            "New arrivals, special offers and exclusive discounts",
        ))
        .setting(text("placeholder", "Placeholder", "Email address"))
        .setting(text("button_text", "Button", "Subscribe"))
        .setting(SettingDescriptor::heading("Design"))
        .setting(color("background_color", "Background", "#3b82f6"))
        .setting(color("text_color", "Text colour", "#ffffff"))
        .setting(
            SettingDescriptor::new(SettingKind::Select, "layout", "Layout")
                .with_options([("center", "Centred"), ("split", "Split")])
                .with_default("center")
                .in_group(SettingGroup::Layout),
        )
        .preset(Preset::new(
            "Default",
            settings_map([
                ("title", "Join our newsletter"),
                ("button_text", "Subscribe"),
                ("background_color", "#3b82f6"),
                ("text_color", "#ffffff"),
                ("layout", "center"),
            ]),
        ))
}

pub fn footer() -> SectionSchema {
    SectionSchema::new("footer", "Site footer", SectionCategory::Footer)
        .describe("Links, contact details and social profiles")
        .setting(SettingDescriptor::heading("General"))
        .setting(text("store_name", "Store name", "My Store"))
        .setting(textarea(
            "description",
            "Store description",
            "Quality products, great service and fast shipping",
        ))
        .setting(SettingDescriptor::heading("Contact"))
        .setting(text("phone", "Phone", "555-0100"))
        .setting(text("email", "Email", "info@example.com"))
        .setting(textarea("address", "Address", "123 Main Street"))
        .setting(SettingDescriptor::heading("Social"))
        .setting(link("facebook_url", "Facebook"))
        .setting(link("instagram_url", "Instagram"))
        .setting(link("whatsapp_url", "WhatsApp"))
        .setting(SettingDescriptor::heading("Design"))
        .setting(color("background_color", "Background", "#1f2937"))
        .setting(color("text_color", "Text colour", "#ffffff"))
        .setting(toggle("show_newsletter", "Newsletter signup", true))
        .setting(toggle("show_payment_icons", "Payment icons", true))
        .block_type(
            BlockSchema::new("footer_column", "Link column")
                .setting(text("title", "Column title", "Quick links")),
        )
        .block_type(
            BlockSchema::new("footer_link", "Link")
                .setting(text("title", "Label", "New link"))
                .setting(link("link", "Target")),
        )
        .max_blocks(12)
        .preset(
            Preset::new(
                "Default",
                settings_map([
                    ("store_name", SettingValue::text("My Store")),
                    ("show_newsletter", SettingValue::Bool(true)),
                    ("show_payment_icons", SettingValue::Bool(true)),
                ]),
            )
            .block(column("Quick links"))
            .block(link_block("footer_link", "About", "/about"))
            .block(link_block("footer_link", "Contact", "/contact"))
            .block(link_block("footer_link", "Terms", "/terms"))
            .block(column("Customer care"))
            .block(link_block("footer_link", "Returns", "/returns"))
            .block(link_block("footer_link", "Shipping", "/shipping"))
            .block(link_block("footer_link", "Support", "/support")),
        )
}

fn column(title: &str) -> PresetBlock {
    PresetBlock::new("footer_column", settings_map([("title", title)]))
}

/// Every stock section in catalogue order.
pub fn all() -> Vec<SectionSchema> {
    vec![
        header(),
        announcement(),
        hero(),
        categories(),
        featured_products(),
        newsletter(),
        footer(),
    ]
}
