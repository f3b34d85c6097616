//! # Repository Module
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  spares-pos adapter                                                    │
//! │       │                                                                 │
//! │       │  db.products().adjust_quantity(id, -2)                         │
//! │       ▼                                                                 │
//! │  ProductRepository                  SaleRepository                     │
//! │  ├── list / get_by_id               ├── create (sale + items, 1 tx)    │
//! │  ├── insert / insert_many           ├── list / get_by_id               │
//! │  ├── update / delete / delete_all   ├── delete (items cascade)         │
//! │  └── adjust_quantity (clamped)      └── renumber_receipts              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod product;
pub mod sale;
