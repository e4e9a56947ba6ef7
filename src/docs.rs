use crate::api::absence::CreateAbsence;
use crate::api::business_trip::CreateTrip;
use crate::api::holiday::CreateHoliday;
use crate::api::project::ProjectPayload;
use crate::api::user::{CreateUser, UpdateUser};
use crate::model::absence::{Absence, AbsenceStatus, AbsenceType};
use crate::model::business_trip::{BusinessTrip, BusinessTripStatus, CarOwnership};
use crate::model::holiday_day::HolidayDay;
use crate::model::project::Project;
use crate::model::user::User;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Company Admin API",
        version = "1.0.0",
        description = r#"
## Company administration backend

Employee absence requests, business-trip requests and the approval workflows
around them.

### Key features
- **Absences** — request, approve/reject, automatic leave-day calculation
  against the holiday calendar, balance bookkeeping
- **Business trips** — request with expense fields, per-month issue numbering,
  approve/reject
- **Holiday calendar** — generated official holidays (including the
  Orthodox-Easter block and compensation days) plus custom company days
- **Users & projects** — administration, year-end balance rollover
- **Exports** — CSV reports of approved absences and trips

### Security
JWT Bearer authentication; administrative operations require the admin role.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::register,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::user::list_users,
        crate::api::user::get_user,
        crate::api::user::create_user,
        crate::api::user::update_user,
        crate::api::user::delete_user,
        crate::api::user::rollover_balances,

        crate::api::absence::create_absence,
        crate::api::absence::my_absences,
        crate::api::absence::all_absences,
        crate::api::absence::get_absence,
        crate::api::absence::cancel_absence,
        crate::api::absence::approve_absence,
        crate::api::absence::reject_absence,
        crate::api::absence::export_absences,

        crate::api::business_trip::create_trip,
        crate::api::business_trip::my_trips,
        crate::api::business_trip::all_trips,
        crate::api::business_trip::get_trip,
        crate::api::business_trip::delete_trip,
        crate::api::business_trip::approve_trip,
        crate::api::business_trip::reject_trip,
        crate::api::business_trip::export_trips,

        crate::api::holiday::list_holidays,
        crate::api::holiday::create_holiday,
        crate::api::holiday::delete_holiday,

        crate::api::project::list_projects,
        crate::api::project::create_project,
        crate::api::project::update_project,
        crate::api::project::delete_project
    ),
    components(
        schemas(
            User,
            CreateUser,
            UpdateUser,
            Absence,
            AbsenceType,
            AbsenceStatus,
            CreateAbsence,
            BusinessTrip,
            BusinessTripStatus,
            CarOwnership,
            CreateTrip,
            HolidayDay,
            CreateHoliday,
            Project,
            ProjectPayload
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login, registration and token handling"),
        (name = "Users", description = "User administration APIs"),
        (name = "Absences", description = "Absence request APIs"),
        (name = "Trips", description = "Business-trip request APIs"),
        (name = "Holidays", description = "Holiday calendar APIs"),
        (name = "Projects", description = "Project administration APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

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
