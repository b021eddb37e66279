//! OpenAPI document, generated by `utoipa` from the route annotations and
//! served at `/api-docs/openapi.json`.

use utoipa::OpenApi;

use crate::models::{
    CreateOrderRequest, CustomerDto, CustomerRequest, OrderDto, OrderItemDto, OrderItemRequest,
    ProductDto,
};
use crate::routes::{self, customers, orders, products};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Order Management API",
        description = "Customers, a read-only product catalog and orders with price snapshots"
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Customers", description = "Customer records"),
        (name = "Products", description = "Product catalog"),
        (name = "Orders", description = "Order queries and placement")
    ),
    paths(
        routes::health,
        routes::readiness,
        customers::index,
        customers::show,
        customers::create,
        customers::update,
        customers::destroy,
        products::index,
        products::show,
        orders::index,
        orders::show,
        orders::create,
    ),
    components(schemas(
        CustomerRequest,
        CustomerDto,
        ProductDto,
        CreateOrderRequest,
        OrderItemRequest,
        OrderDto,
        OrderItemDto,
    ))
)]
pub struct ApiDoc;
