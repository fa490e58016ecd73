use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        addresses::{AddressList, AddressRequest},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        categories::{CategoryList, CategoryRequest},
        orders::{
            CategoryRef, CreateOrderRequest, CreatedOrder, OrderLineRequest, OrderLineView,
            OrderPage, OrderView, ShippingAddressView, SnapshotPhoto, SnapshotView, StoreRef,
        },
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        regions::{City, CityList, Province, ProvinceList},
        stores::{StoreList, UpdateStoreRequest},
        users::{Profile, ProfileCity, ProfileProvince, UpdateProfileRequest},
    },
    error::{ErrorData, ErrorKind},
    models::{Address, Category, Product, ProductPhoto, Store, User},
    response::{ApiResponse, Meta},
    routes::{
        addresses, auth, categories, health, orders, params, products as product_routes, regions,
        stores, users,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        users::get_profile,
        users::update_profile,
        regions::list_provinces,
        regions::get_province,
        regions::list_cities,
        regions::get_city,
        addresses::list_addresses,
        addresses::create_address,
        addresses::get_address,
        addresses::update_address,
        addresses::delete_address,
        stores::list_stores,
        stores::get_my_store,
        stores::update_my_store,
        stores::get_store,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        product_routes::list_products,
        product_routes::get_product,
        product_routes::create_product,
        product_routes::update_product,
        product_routes::delete_product,
        orders::list_orders,
        orders::create_order,
        orders::get_order
    ),
    components(
        schemas(
            User,
            Store,
            Category,
            Product,
            ProductPhoto,
            Address,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            AddressRequest,
            AddressList,
            UpdateStoreRequest,
            CategoryRequest,
            StoreList,
            Profile,
            ProfileProvince,
            ProfileCity,
            UpdateProfileRequest,
            Province,
            City,
            ProvinceList,
            CityList,
            CategoryList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CreateOrderRequest,
            OrderLineRequest,
            CreatedOrder,
            OrderPage,
            OrderView,
            ShippingAddressView,
            OrderLineView,
            SnapshotView,
            StoreRef,
            CategoryRef,
            SnapshotPhoto,
            ErrorKind,
            ErrorData,
            params::Pagination,
            params::SortOrder,
            params::ProductSortBy,
            params::ProductQuery,
            params::OrderListQuery,
            params::StoreQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderView>,
            ApiResponse<OrderPage>,
            ApiResponse<CreatedOrder>,
            ApiResponse<ErrorData>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "Users", description = "Profile of the current user"),
        (name = "Regions", description = "Province and city directory"),
        (name = "Addresses", description = "Shipping addresses of the current user"),
        (name = "Stores", description = "Store endpoints"),
        (name = "Categories", description = "Product categories"),
        (name = "Products", description = "Product catalog"),
        (name = "Orders", description = "Order placement and order history"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_order_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/orders"));
        assert!(doc.paths.paths.contains_key("/api/orders/{order_id}"));
        assert!(doc.paths.paths.contains_key("/api/products/{id}"));
        assert!(doc.paths.paths.contains_key("/api/regions/provinces/{province_id}/cities"));
        assert!(doc.paths.paths.contains_key("/api/users/me"));
    }
}
