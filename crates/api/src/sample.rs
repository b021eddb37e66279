//! Sample catalog, customers and orders loaded by `om-cli seed` and by the
//! in-memory test store.
//!
//! Prices are whole VND amounts.

/// A seeded customer.
#[derive(Debug, Clone, Copy)]
pub struct SampleCustomer {
    pub id: i32,
    pub full_name: &'static str,
    pub address: &'static str,
    pub phone_number: &'static str,
}

/// A seeded product.
#[derive(Debug, Clone, Copy)]
pub struct SampleProduct {
    pub id: i32,
    pub name: &'static str,
    pub price: i64,
}

/// A seeded order line.
#[derive(Debug, Clone, Copy)]
pub struct SampleItem {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: i64,
}

/// A seeded order. `placed_at` is RFC 3339.
#[derive(Debug, Clone, Copy)]
pub struct SampleOrder {
    pub id: i32,
    pub customer_id: i32,
    pub placed_at: &'static str,
    pub items: &'static [SampleItem],
}

impl SampleOrder {
    /// Sum of `quantity * unit_price` over the order's items.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.items
            .iter()
            .map(|item| i64::from(item.quantity) * item.unit_price)
            .sum()
    }
}

pub const CUSTOMERS: &[SampleCustomer] = &[
    SampleCustomer {
        id: 1,
        full_name: "Nguyễn Văn A",
        address: "123 Đường ABC, TP.HCM",
        phone_number: "0901234567",
    },
    SampleCustomer {
        id: 2,
        full_name: "Trần Thị B",
        address: "456 Đường XYZ, Hà Nội",
        phone_number: "0987654321",
    },
    SampleCustomer {
        id: 3,
        full_name: "Lê Văn C",
        address: "789 Đường DEF, Đà Nẵng",
        phone_number: "0912345678",
    },
];

pub const PRODUCTS: &[SampleProduct] = &[
    SampleProduct {
        id: 1,
        name: "Laptop Dell",
        price: 15_000_000,
    },
    SampleProduct {
        id: 2,
        name: "Mouse Logitech",
        price: 500_000,
    },
    SampleProduct {
        id: 3,
        name: "Keyboard Mechanical",
        price: 1_200_000,
    },
    SampleProduct {
        id: 4,
        name: "Monitor Samsung",
        price: 8_000_000,
    },
];

pub const ORDERS: &[SampleOrder] = &[
    SampleOrder {
        id: 1,
        customer_id: 1,
        placed_at: "2024-12-01T10:30:00Z",
        items: &[
            SampleItem {
                id: 1,
                product_id: 1,
                quantity: 2,
                unit_price: 15_000_000,
            },
            SampleItem {
                id: 2,
                product_id: 2,
                quantity: 2,
                unit_price: 500_000,
            },
        ],
    },
    SampleOrder {
        id: 2,
        customer_id: 2,
        placed_at: "2024-12-02T14:15:00Z",
        items: &[
            SampleItem {
                id: 3,
                product_id: 4,
                quantity: 1,
                unit_price: 8_000_000,
            },
            SampleItem {
                id: 4,
                product_id: 3,
                quantity: 1,
                unit_price: 1_200_000,
            },
        ],
    },
    SampleOrder {
        id: 3,
        customer_id: 1,
        placed_at: "2024-12-03T09:45:00Z",
        items: &[
            SampleItem {
                id: 5,
                product_id: 3,
                quantity: 1,
                unit_price: 1_200_000,
            },
            SampleItem {
                id: 6,
                product_id: 2,
                quantity: 1,
                unit_price: 500_000,
            },
        ],
    },
];
