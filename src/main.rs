#[rocket::launch]
fn rocket() -> _ {
    let rocket = outstack_api::rocket();
    log::info!("Starting Outstack API Server");
    rocket
}
